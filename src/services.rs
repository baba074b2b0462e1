pub mod auth;
pub use auth::AuthService;
pub mod authz_service;
pub use authz_service::AuthzService;
pub mod membership_service;
pub use membership_service::MembershipResolver;
pub mod rbac_service;
pub use rbac_service::RbacService;
pub mod studio_service;
pub use studio_service::StudioService;
pub mod staff_service;
pub use staff_service::StaffService;
pub mod admin_service;
pub use admin_service::AdminService;
pub mod session;
pub use session::SessionManager;
