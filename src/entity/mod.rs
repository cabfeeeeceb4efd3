pub mod course_cart_items;
pub mod course_carts;
pub mod course_certificates;
pub mod course_chapters;
pub mod course_lessons;
pub mod course_likes;
pub mod course_purchases;
pub mod course_ratings;
pub mod course_reviews;
pub mod courses;
pub mod shipping_certificate_items;
pub mod shipping_certificates;
pub mod users;
pub mod verification_codes;

pub use course_cart_items::Entity as CourseCartItems;
pub use course_carts::Entity as CourseCarts;
pub use course_certificates::Entity as CourseCertificates;
pub use course_chapters::Entity as CourseChapters;
pub use course_lessons::Entity as CourseLessons;
pub use course_likes::Entity as CourseLikes;
pub use course_purchases::Entity as CoursePurchases;
pub use course_ratings::Entity as CourseRatings;
pub use course_reviews::Entity as CourseReviews;
pub use courses::Entity as Courses;
pub use shipping_certificate_items::Entity as ShippingCertificateItems;
pub use shipping_certificates::Entity as ShippingCertificates;
pub use users::Entity as Users;
pub use verification_codes::Entity as VerificationCodes;
