//! Database entities

pub mod book;
pub mod comment;
pub mod member;
pub mod relationship;
pub mod site_option;

pub use book::Entity as Book;
pub use comment::Entity as Comment;
pub use member::Entity as Member;
pub use relationship::Entity as Relationship;
pub use site_option::Entity as SiteOption;

pub mod prelude {
    pub use super::book::Entity as Book;
    pub use super::comment::Entity as Comment;
    pub use super::member::Entity as Member;
    pub use super::relationship::Entity as Relationship;
    pub use super::site_option::Entity as SiteOption;
}
