// Services module - clients for external collaborators

pub mod email;
pub mod supabase;

pub use email::{EmailError, EmailService, EmailTemplate};
pub use supabase::{SupabaseError, SupabaseService};
