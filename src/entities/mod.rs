//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod category_follow;
pub mod time_entry;
pub mod user;
pub mod weekday_hours;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use category_follow::{
    Column as CategoryFollowColumn, Entity as CategoryFollow, Model as CategoryFollowModel,
};
pub use time_entry::{Column as TimeEntryColumn, Entity as TimeEntry, Model as TimeEntryModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use weekday_hours::{
    Column as WeekdayHoursColumn, Entity as WeekdayHours, Model as WeekdayHoursModel,
};
