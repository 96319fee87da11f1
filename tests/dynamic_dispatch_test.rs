use courseway::domain::course::Course;
use courseway::domain::ids::{CourseId, LessonId, UserId};
use courseway::domain::ports::{CompletionStoreBox, CourseCatalogBox, UserStoreBox};
use courseway::domain::user::User;
use courseway::infrastructure::in_memory::{
    InMemoryCompletionStore, InMemoryCourseCatalog, InMemoryUserStore,
};

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let user_store: UserStoreBox = Box::new(InMemoryUserStore::new());
    let catalog: CourseCatalogBox = Box::new(InMemoryCourseCatalog::new());
    let completions: CompletionStoreBox = Box::new(InMemoryCompletionStore::new());

    let course = Course::free("c1", "Intro", UserId::from("teacher"));

    // Verify Send + Sync by spawning tasks
    let user_handle = tokio::spawn(async move {
        user_store.store(User::new("u1")).await.unwrap();
        user_store
            .add_course(&UserId::from("u1"), &CourseId::from("c1"))
            .await
            .unwrap();
        user_store.get(&UserId::from("u1")).await.unwrap().unwrap()
    });

    let catalog_handle = tokio::spawn(async move {
        catalog.store(course).await.unwrap();
        catalog.get(&CourseId::from("c1")).await.unwrap().unwrap()
    });

    let completion_handle = tokio::spawn(async move {
        completions
            .mark(&UserId::from("u1"), &CourseId::from("c1"), LessonId::from("l1"))
            .await
            .unwrap();
        completions
            .get(&UserId::from("u1"), &CourseId::from("c1"))
            .await
            .unwrap()
            .unwrap()
    });

    let user = user_handle.await.unwrap();
    assert!(user.is_enrolled(&CourseId::from("c1")));

    let course = catalog_handle.await.unwrap();
    assert_eq!(course.id, CourseId::from("c1"));

    let record = completion_handle.await.unwrap();
    assert_eq!(record.lessons.len(), 1);
}
