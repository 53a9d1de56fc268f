//! Presentation adapters over [`TodoListStore`](crate::TodoListStore).
//!
//! The same list behavior is wired through nine architectural styles. Each
//! adapter translates its own input events into `add_task`/`remove_task`
//! calls and re-renders a [`TodoView`](crate::view::TodoView) from the
//! resulting snapshot. None of them add list logic of their own.
//!
//! | Architecture | Module |
//! |---|---|
//! | MVC | [`mvc`] |
//! | MVVM, SwiftUI+MVVM | [`mvvm`] |
//! | RxSwift, RxSwift+MVVM | [`rx`] |
//! | Clean Architecture | [`clean`] |
//! | VIPER | [`viper`] |
//! | SwiftUI | [`declarative`] |
//! | TCA | [`reducer`] |

pub mod clean;
pub mod declarative;
pub mod mvc;
pub mod mvvm;
pub mod reducer;
pub mod rx;
pub mod viper;

use crate::policy::InputPolicy;
use crate::store::TodoListStore;
use crate::types::{TaskRecord, TodoListError};
use crate::view::RecordingView;
use composable_todo_core::environment::{IdGenerator, RandomIdGenerator};
use composable_todo_runtime::{StoreConfig, StoreError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced to whoever drives a screen
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScreenError {
    /// The list rejected the operation
    #[error(transparent)]
    List(#[from] TodoListError),

    /// The reducer store failed to process an action
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The reducer never reported how a command ended
    #[error("No outcome observed for {0}")]
    MissingOutcome(&'static str),
}

/// Uniform driving surface shared by every adapter
///
/// This is what a user does on any of the screens: type into the input,
/// press add, swipe rows away, and look at the list.
pub trait TodoScreen {
    /// Which architecture this screen is built with
    fn architecture(&self) -> Architecture;

    /// Empty-input policy in force
    fn policy(&self) -> InputPolicy;

    /// Replace the contents of the text input
    fn set_draft(&mut self, text: &str);

    /// Current contents of the text input
    fn draft(&self) -> String;

    /// Press "add": turn the draft into a task if the policy allows it
    ///
    /// Returns `Ok(None)` when the draft was rejected. The draft is cleared
    /// after an accepted add.
    ///
    /// # Errors
    ///
    /// Only the reducer-driven screen can fail here, with a store error.
    fn submit(&mut self) -> Result<Option<TaskRecord>, ScreenError>;

    /// Swipe-to-delete the row at `index`
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`] for a position outside the list.
    fn delete(&mut self, index: usize) -> Result<TaskRecord, ScreenError>;

    /// Delete several rows at once (positions before removal)
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`] if any offset is invalid; nothing is
    /// removed in that case.
    fn delete_offsets(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, ScreenError>;

    /// The list as held by the screen's model
    fn snapshot(&self) -> Vec<TaskRecord>;

    /// The rows the view last rendered
    fn rows(&self) -> Vec<String>;

    /// Type `text` and press add
    ///
    /// # Errors
    ///
    /// See [`TodoScreen::submit`].
    fn enter(&mut self, text: &str) -> Result<Option<TaskRecord>, ScreenError> {
        self.set_draft(text);
        self.submit()
    }
}

/// Construction options shared by every screen
#[derive(Clone)]
pub struct ScreenOptions {
    /// Overrides the architecture's own empty-input policy
    pub policy: Option<InputPolicy>,
    /// Source of task ids
    pub ids: Arc<dyn IdGenerator>,
    /// Store configuration for the reducer-driven screen
    pub store_config: StoreConfig,
}

impl ScreenOptions {
    /// Override the empty-input policy
    #[must_use]
    pub const fn with_policy(mut self, policy: InputPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Use a specific id generator
    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Use a specific store configuration
    #[must_use]
    pub fn with_store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = config;
        self
    }

    fn new_store(&self) -> TodoListStore {
        TodoListStore::with_id_generator(Arc::clone(&self.ids))
    }
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            policy: None,
            ids: Arc::new(RandomIdGenerator),
            store_config: StoreConfig::default(),
        }
    }
}

impl std::fmt::Debug for ScreenOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenOptions")
            .field("policy", &self.policy)
            .field("store_config", &self.store_config)
            .finish_non_exhaustive()
    }
}

/// The nine architectural styles, in navigation-list order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    /// Model-View-Controller
    Mvc,
    /// Model-View-ViewModel
    Mvvm,
    /// Reactive streams bound straight to the controller
    Rx,
    /// Reactive streams exposed by a view model
    RxMvvm,
    /// Use case + presenter
    Clean,
    /// View-Interactor-Presenter-Entity-Router
    Viper,
    /// Declarative view owning its state
    SwiftUi,
    /// Declarative view over an observable view model
    SwiftUiMvvm,
    /// Reducer over state and actions (unidirectional data flow)
    Tca,
}

impl Architecture {
    /// All architectures in navigation-list order
    pub const ALL: [Self; 9] = [
        Self::Mvc,
        Self::Mvvm,
        Self::Rx,
        Self::RxMvvm,
        Self::Clean,
        Self::Viper,
        Self::SwiftUi,
        Self::SwiftUiMvvm,
        Self::Tca,
    ];

    /// Title shown in the navigation list and on the screen
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Mvc => "MVC",
            Self::Mvvm => "MVVM",
            Self::Rx => "RxSwift",
            Self::RxMvvm => "RxSwift+MVVM",
            Self::Clean => "Clean Architecture",
            Self::Viper => "VIPER",
            Self::SwiftUi => "SwiftUI",
            Self::SwiftUiMvvm => "SwiftUI+MVVM",
            Self::Tca => "TCA",
        }
    }

    const fn identifier(self) -> &'static str {
        match self {
            Self::Mvc => "mvc",
            Self::Mvvm => "mvvm",
            Self::Rx => "rx",
            Self::RxMvvm => "rxmvvm",
            Self::Clean => "clean",
            Self::Viper => "viper",
            Self::SwiftUi => "swiftui",
            Self::SwiftUiMvvm => "swiftuimvvm",
            Self::Tca => "tca",
        }
    }

    /// Empty-input handling each screen uses unless overridden
    ///
    /// MVC, MVVM, RxSwift and Clean guard against empty input; the others
    /// add whatever was typed.
    #[must_use]
    pub const fn default_policy(self) -> InputPolicy {
        match self {
            Self::Mvc | Self::Mvvm | Self::Rx | Self::Clean => InputPolicy::RejectBlank,
            Self::RxMvvm | Self::Viper | Self::SwiftUi | Self::SwiftUiMvvm | Self::Tca => {
                InputPolicy::AcceptAll
            },
        }
    }

    /// Build a screen rendering into a [`RecordingView`]
    #[must_use]
    pub fn build(self, options: &ScreenOptions) -> Box<dyn TodoScreen> {
        let policy = options.policy.unwrap_or_else(|| self.default_policy());
        let tasks = options.new_store();
        let view = RecordingView::new();

        tracing::debug!(architecture = self.display_name(), ?policy, "Building screen");

        match self {
            Self::Mvc => Box::new(mvc::MvcTodoController::new(view, tasks, policy)),
            Self::Mvvm => Box::new(mvvm::MvvmTodoController::new(view, tasks, policy)),
            Self::Rx => Box::new(rx::RxTodoController::bound_to_relay(view, tasks, policy)),
            Self::RxMvvm => Box::new(rx::RxTodoController::bound_to_view_model(view, tasks, policy)),
            Self::Clean => {
                let use_case = Box::new(clean::TodoInteractor::new(tasks));
                Box::new(clean::CleanTodoViewController::new(view, use_case, policy))
            },
            Self::Viper => Box::new(viper::ViperTodoRouter::create_module(
                view,
                clean::TodoInteractor::new(tasks),
                policy,
            )),
            Self::SwiftUi => Box::new(declarative::DeclarativeTodoView::new(view, tasks, policy)),
            Self::SwiftUiMvvm => {
                Box::new(mvvm::ObservedTodoView::new(view, mvvm::TodoViewModel::new(tasks), policy))
            },
            Self::Tca => Box::new(reducer::ReducerTodoView::new(
                view,
                tasks,
                policy,
                options.store_config.clone(),
            )),
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Error returned when parsing an unknown architecture name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown architecture '{0}'")]
pub struct ParseArchitectureError(pub String);

impl FromStr for Architecture {
    type Err = ParseArchitectureError;

    /// Accepts the display name or identifier, ignoring case and punctuation
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .into_iter()
            .find(|architecture| {
                let display: String = architecture
                    .display_name()
                    .chars()
                    .filter(char::is_ascii_alphanumeric)
                    .map(|c| c.to_ascii_lowercase())
                    .collect();
                display == wanted || architecture.identifier() == wanted
            })
            .ok_or_else(|| ParseArchitectureError(s.to_string()))
    }
}
