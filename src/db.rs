pub mod store;

pub mod account_repo;
pub use account_repo::AccountRepository;
pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod studio_repo;
pub use studio_repo::StudioRepository;
pub mod role_repo;
pub use role_repo::RoleRepository;
pub mod membership_repo;
pub use membership_repo::MembershipRepository;
