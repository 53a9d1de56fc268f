//! One todo list, nine ways to put it on screen.
//!
//! The domain is deliberately tiny: an ordered list of tasks that can be
//! appended to and removed from by position. [`TodoListStore`] holds that
//! behavior once. The [`patterns`] module wires it through nine
//! presentation architectures (MVC, MVVM, reactive streams, Clean, VIPER,
//! declarative views and a reducer store) that all render the same list.
//!
//! # Quick Start
//!
//! ```
//! use todo_list::{Architecture, ScreenOptions, TodoScreen};
//!
//! # fn main() -> Result<(), todo_list::ScreenError> {
//! let mut screen = Architecture::Tca.build(&ScreenOptions::default());
//!
//! screen.enter("buy milk")?;
//! screen.enter("walk dog")?;
//! screen.delete(0)?;
//!
//! assert_eq!(screen.rows(), vec!["walk dog"]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod patterns;
pub mod policy;
pub mod store;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use patterns::{Architecture, ScreenError, ScreenOptions, TodoScreen};
pub use policy::InputPolicy;
pub use store::TodoListStore;
pub use types::{TaskId, TaskRecord, TodoListError};
