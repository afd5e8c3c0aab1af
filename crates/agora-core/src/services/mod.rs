//! Services - use cases composed from the domain and the ports.

mod awards;
mod comments;
mod communities;
mod flags;
mod messages;
mod notifications;
mod posts;
mod saved;
mod users;

pub use awards::AwardService;
pub use comments::CommentService;
pub use communities::CommunityService;
pub use flags::{CategoryAssignments, FlagList, LocalDocument};
pub use messages::MessageService;
pub use notifications::NotificationService;
pub use posts::PostService;
pub use saved::SavedService;
pub use users::UserService;
