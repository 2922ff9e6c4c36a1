//! Domain ports: the traits adapters implement (driven) or call (driving).

mod macros;
pub(crate) use macros::define_port_error;

mod invitation_command;
mod invitation_repository;
mod login_service;
mod notification_sink;
mod tour_command;
mod tour_query;
mod tour_repository;
mod user_account_command;
mod user_repository;
mod users_query;

pub use invitation_command::InvitationCommand;
#[cfg(test)]
pub use invitation_command::MockInvitationCommand;
#[cfg(test)]
pub use invitation_repository::MockInvitationRepository;
pub use invitation_repository::{InvitationRepository, InvitationRepositoryError};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use notification_sink::MockNotificationSink;
pub use notification_sink::{NotificationSink, NotificationSinkError};
#[cfg(test)]
pub use tour_command::MockTourCommand;
pub use tour_command::TourCommand;
#[cfg(test)]
pub use tour_query::MockTourQuery;
pub use tour_query::TourQuery;
#[cfg(test)]
pub use tour_repository::MockTourRepository;
pub use tour_repository::{TourRepository, TourRepositoryError};
#[cfg(test)]
pub use user_account_command::MockUserAccountCommand;
pub use user_account_command::UserAccountCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
