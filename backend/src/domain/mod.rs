//! Domain primitives, policy, and services.
//!
//! Purpose: hold the club's rules (roles, tour lifecycle, permissions, the
//! last-admin safeguard) independently of HTTP and storage. Adapters depend
//! on this module; it depends on nothing outside the crate's ports.
//!
//! Public surface:
//! - Error / ErrorCode — failure payload shared by every operation.
//! - Role, User, Tour, Invitation — aggregates and value types.
//! - permissions — the single source of truth for authorisation.
//! - TourService, UserAccountService, InvitationService,
//!   BootstrapLoginService — driving port implementations.

pub mod admin_guard;
pub mod auth;
pub mod error;
pub mod invitation;
pub mod invitation_service;
pub mod login_service;
pub mod notification;
pub mod permissions;
pub mod ports;
pub mod role;
pub mod tour;
pub mod tour_service;
pub mod trace_id;
pub mod user;
pub mod user_account_service;

pub use self::admin_guard::{AccountChange, LastAdminViolation, check_account_change};
pub use self::auth::{BootstrapAdmin, LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError, LAST_ADMIN_MESSAGE};
pub use self::invitation::{
    AcceptanceError, Email, INVITATION_TTL_DAYS, Invitation, InvitationStatus, InvitationToken,
    InvitationValidationError,
};
pub use self::invitation_service::InvitationService;
pub use self::login_service::BootstrapLoginService;
pub use self::notification::{Notification, NotificationKind};
pub use self::permissions::Actor;
pub use self::role::{ParseRoleError, Role};
pub use self::tour::{
    ParseTourStatusError, ParticipationError, TOUR_CAPACITY_MAX, TOUR_DESCRIPTION_MAX,
    TOUR_TITLE_MAX, Tour, TourChange, TourChangeError, TourDetails, TourId, TourRecord,
    TourStatus, TourTitle, TourValidationError, TransitionError,
};
pub use self::tour_service::TourService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DISPLAY_NAME_MAX, DISPLAY_NAME_MIN, DisplayName, User, UserId, UserValidationError,
};
pub use self::user_account_service::UserAccountService;
