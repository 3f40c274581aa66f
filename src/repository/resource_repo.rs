// ==========================================
// SkillFlow Ledger - resource repository
// ==========================================
// Tables: resource, booking
// Lock and release write both tables inside one transaction so the
// status flag and the booking log never disagree
// ==========================================

mod bookings;
mod core;
mod lock;


pub use self::core::ResourceRepository;
pub(crate) use self::lock::release_in_tx;
