//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod account_member;
pub mod entry;
pub mod event;
pub mod event_notification;
pub mod event_participant;
pub mod ledger_transaction;
pub mod location;
pub mod location_email_template;
pub mod location_role;
pub mod resource;
pub mod stay;
pub mod user;
pub mod user_group;
pub mod weekly_subscription;

// Re-export specific types to avoid conflicts
pub use account::{Entity as Account, Model as AccountModel};
pub use account_member::{AccountRole, Entity as AccountMember};
pub use entry::{Entity as Entry, Model as EntryModel};
pub use event::{Entity as Event, EventStatus, Model as EventModel, Visibility};
pub use event_notification::Entity as EventNotification;
pub use event_participant::{Entity as EventParticipant, ParticipantRole};
pub use ledger_transaction::{Entity as LedgerTransaction, Model as LedgerTransactionModel};
pub use location::{Entity as Location, Model as LocationModel};
pub use location_email_template::Entity as LocationEmailTemplate;
pub use location_role::{Entity as LocationRole, LocationRoleKind};
pub use resource::{Entity as Resource, Model as ResourceModel};
pub use stay::{Entity as Stay, Model as StayModel, StayStatus};
pub use user::{Entity as User, Model as UserModel};
pub use user_group::Entity as UserGroup;
pub use weekly_subscription::Entity as WeeklySubscription;
