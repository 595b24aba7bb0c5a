pub mod clock;
pub mod directory;
pub mod supabase;
pub mod working_hours;
pub mod registration;

pub use clock::{normalize_clock_time, parse_clock_time};
pub use directory::{Directory, InMemoryDirectory};
pub use supabase::SupabaseDirectory;
pub use working_hours::working_hour_options;
pub use registration::AdviserAdminService;
