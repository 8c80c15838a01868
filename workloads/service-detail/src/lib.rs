//! Service detail page workload.
//!
//! On service pages the contact section is loaded as a fragment into its
//! placeholder and the contact form inside it is bound:
//! - `ServicePage` - Page detection and the ready sequence
//! - `ContactForm` - Required-field and email validation, simulated submission
//! - `Notifier` - Single toast notification appended to the body
//! - `animate_counters` - Count-up animation for `.stat-card h3` statistics
//! - `Delay` - Timer seam (`TokioDelay` in production)

mod contact;
mod counters;
mod notification;
mod page;
mod timer;

pub use contact::*;
pub use counters::*;
pub use notification::*;
pub use page::*;
pub use timer::*;
