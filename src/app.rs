//! Application state management for Foody
//!
//! This module contains the main application state, handling keyboard input,
//! load requests, background messages and state transitions between views.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, warn};

use foody::cache::LocalCache;
use foody::cli::StartupConfig;
use foody::data::{MealAndDietType, RecipeResultSet, DIET_TYPES, MEAL_TYPES};
use foody::loader::{self, AppMessage, LoaderHandle};
use foody::network::ConnectivityStream;
use foody::preferences::PreferenceStore;
use foody::retrieval::{RecipeRetriever, RetrievalStatus};

/// How long a notification stays on screen
const NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

/// Message shown when the network goes away
pub const OFFLINE_MESSAGE: &str = "No Internet Connection.";

/// Message shown when the network comes back after being lost
pub const BACK_ONLINE_MESSAGE: &str = "We're back online.";

/// Application state enum representing the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state before the first result arrives
    Loading,
    /// List view showing the recipes
    RecipeList,
    /// Meal/diet type selection shown over the list
    FilterSheet,
}

/// Chip group focused in the filter sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterGroup {
    Meal,
    Diet,
}

/// A transient message, the terminal equivalent of a toast
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub shown_at: Instant,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Index of currently selected recipe in list view
    pub selected_index: usize,
    /// Recipes currently displayed
    pub recipes: RecipeResultSet,
    /// Whether a load is in flight (drives the loading indicator)
    pub is_loading: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Last known network availability
    pub network_available: Option<bool>,
    /// Notification currently shown, if any
    pub notification: Option<Notification>,
    /// Filter selection the current recipes were requested with
    pub current_filter: MealAndDietType,
    /// Focused chip group in the filter sheet
    pub filter_group: FilterGroup,
    /// Highlighted meal type chip in the filter sheet
    pub filter_meal_index: usize,
    /// Highlighted diet type chip in the filter sheet
    pub filter_diet_index: usize,
    /// When the cached snapshot was written
    pub cached_at: Option<DateTime<Local>>,
    /// Pending load request; the value is the force-refresh flag
    load_request: Option<bool>,
    /// Saved selection not yet backed by a successful load
    pending_filter: Option<MealAndDietType>,
    retriever: Arc<RecipeRetriever>,
    preferences: Arc<PreferenceStore>,
    cache: Arc<LocalCache>,
    loader: LoaderHandle,
}

impl App {
    /// Creates a new App instance wired to its collaborators
    pub fn new(
        retriever: Arc<RecipeRetriever>,
        preferences: Arc<PreferenceStore>,
        cache: Arc<LocalCache>,
    ) -> Self {
        let current_filter = preferences.read_meal_and_diet_type();
        let cached_at = cache.cached_at().map(|t| t.with_timezone(&Local));
        Self {
            state: AppState::Loading,
            selected_index: 0,
            recipes: RecipeResultSet::empty(),
            is_loading: false,
            should_quit: false,
            show_help: false,
            network_available: None,
            notification: None,
            filter_group: FilterGroup::Meal,
            filter_meal_index: current_filter.selected_meal_type_id,
            filter_diet_index: current_filter.selected_diet_type_id,
            current_filter,
            cached_at,
            load_request: None,
            pending_filter: None,
            retriever,
            preferences,
            cache,
            loader: LoaderHandle::new(),
        }
    }

    /// Applies the startup configuration and queues the first load
    ///
    /// Filters given on the command line are saved like a filter sheet
    /// selection, and the first load is forced if they changed anything.
    pub fn apply_startup_config(&mut self, config: &StartupConfig) {
        if config.changes_filter() {
            let saved = self.preferences.read_meal_and_diet_type();
            let meal_id = config.meal_type_id.unwrap_or(saved.selected_meal_type_id);
            let diet_id = config.diet_type_id.unwrap_or(saved.selected_diet_type_id);
            self.save_filter(meal_id, diet_id);
        }
        self.request_load(config.force_refresh);
    }

    /// Starts forwarding connectivity transitions to the app
    pub fn watch_connectivity(&self, stream: ConnectivityStream) {
        self.loader.forward_connectivity(stream);
    }

    /// Returns the total number of recipes displayed
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    /// Queues a load; a forced request wins over a plain one
    pub fn request_load(&mut self, force_refresh: bool) {
        let force = self.load_request.unwrap_or(false) || force_refresh;
        self.load_request = Some(force);
    }

    /// Spawns the queued load, if any
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch_pending_load(&mut self) {
        if let Some(force_refresh) = self.load_request.take() {
            let epoch = self.loader.spawn_load(&self.retriever, force_refresh);
            debug!(epoch = epoch.value(), force_refresh, "Load dispatched");
            self.is_loading = true;
        }
    }

    /// Applies all messages currently waiting on the channel
    pub fn process_messages(&mut self) {
        while let Some(message) = loader::try_recv(&mut self.loader) {
            self.apply_message(message);
        }
    }

    /// Applies one background message
    pub fn apply_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::Status { epoch, status } => {
                if !self.retriever.is_current(epoch) {
                    debug!(epoch = epoch.value(), "Discarding superseded load result");
                    return;
                }
                self.apply_status(status);
            }
            AppMessage::Connectivity(available) => self.apply_connectivity(available),
        }
    }

    fn apply_status(&mut self, status: RetrievalStatus) {
        match status {
            RetrievalStatus::Loading => {
                self.is_loading = true;
            }
            RetrievalStatus::Success(recipes) => {
                self.is_loading = false;
                if let Some(filter) = self.pending_filter.take() {
                    self.current_filter = filter;
                }
                self.show_recipes(recipes);
            }
            RetrievalStatus::Error { message, cached } => {
                self.is_loading = false;
                self.notify(message);
                if !cached.is_empty() {
                    self.show_recipes(cached);
                } else if self.state == AppState::Loading {
                    self.state = AppState::RecipeList;
                }
            }
        }
    }

    fn show_recipes(&mut self, recipes: RecipeResultSet) {
        self.recipes = recipes;
        if self.selected_index >= self.recipes.len() {
            self.selected_index = 0;
        }
        self.cached_at = self.cache.cached_at().map(|t| t.with_timezone(&Local));
        if self.state == AppState::Loading {
            self.state = AppState::RecipeList;
        }
    }

    /// Announces connectivity changes and remembers that the app went offline
    fn apply_connectivity(&mut self, available: bool) {
        self.network_available = Some(available);

        if !available {
            self.notify(OFFLINE_MESSAGE);
            if let Err(e) = self.preferences.save_back_online(true) {
                warn!(error = %e, "Failed to save back-online flag");
            }
        } else if self.preferences.read_back_online() {
            self.notify(BACK_ONLINE_MESSAGE);
            if let Err(e) = self.preferences.save_back_online(false) {
                warn!(error = %e, "Failed to save back-online flag");
            }
        }
    }

    /// Shows a transient notification
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification {
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    /// Clears the notification once it has been visible long enough
    pub fn tick(&mut self) {
        if let Some(ref notification) = self.notification {
            if notification.shown_at.elapsed() >= NOTIFICATION_DURATION {
                self.notification = None;
            }
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q` or `Esc` (in RecipeList): Quit the application
    /// - `Up`/`k`, `Down`/`j`: Move selection in the list
    /// - `f`: Open the filter sheet
    /// - `r`: Fetch fresh recipes
    /// - `?`: Toggle help
    /// - `Tab` (in FilterSheet): Switch between meal and diet types
    /// - `Left`/`h`, `Right`/`l` (in FilterSheet): Move between chips
    /// - `Enter` (in FilterSheet): Apply the selection and fetch
    /// - `Esc` (in FilterSheet): Close without applying
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {} // Ignore other keys when help is shown
            }
            return;
        }

        match self.state {
            AppState::Loading => {
                // Only quit is allowed during loading
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::RecipeList => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Char('f') => {
                    self.open_filter_sheet();
                }
                KeyCode::Char('r') => {
                    self.request_load(true);
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::FilterSheet => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.state = AppState::RecipeList;
                }
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    self.toggle_filter_group();
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    self.move_chip_left();
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    self.move_chip_right();
                }
                KeyCode::Enter => {
                    self.apply_filter();
                }
                _ => {}
            },
        }
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.recipe_count();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.recipe_count();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }

    /// Opens the filter sheet with the saved selection highlighted
    fn open_filter_sheet(&mut self) {
        let saved = self.preferences.read_meal_and_diet_type();
        self.filter_meal_index = saved.selected_meal_type_id.min(MEAL_TYPES.len() - 1);
        self.filter_diet_index = saved.selected_diet_type_id.min(DIET_TYPES.len() - 1);
        self.filter_group = FilterGroup::Meal;
        self.state = AppState::FilterSheet;
    }

    fn toggle_filter_group(&mut self) {
        self.filter_group = match self.filter_group {
            FilterGroup::Meal => FilterGroup::Diet,
            FilterGroup::Diet => FilterGroup::Meal,
        };
    }

    /// Moves the highlighted chip left, wrapping at the start
    fn move_chip_left(&mut self) {
        let (index, count) = self.focused_chip();
        *index = if *index == 0 { count - 1 } else { *index - 1 };
    }

    /// Moves the highlighted chip right, wrapping at the end
    fn move_chip_right(&mut self) {
        let (index, count) = self.focused_chip();
        *index = (*index + 1) % count;
    }

    fn focused_chip(&mut self) -> (&mut usize, usize) {
        match self.filter_group {
            FilterGroup::Meal => (&mut self.filter_meal_index, MEAL_TYPES.len()),
            FilterGroup::Diet => (&mut self.filter_diet_index, DIET_TYPES.len()),
        }
    }

    /// Saves the highlighted chips and returns to the list with a forced refresh
    fn apply_filter(&mut self) {
        self.save_filter(self.filter_meal_index, self.filter_diet_index);
        self.state = AppState::RecipeList;
        self.request_load(true);
    }

    fn save_filter(&mut self, meal_id: usize, diet_id: usize) {
        let Some(selection) = MealAndDietType::from_ids(meal_id, diet_id) else {
            return;
        };
        if let Err(e) = self.preferences.save_meal_and_diet_type(
            &selection.selected_meal_type,
            selection.selected_meal_type_id,
            &selection.selected_diet_type,
            selection.selected_diet_type_id,
        ) {
            warn!(error = %e, "Failed to save filter selection");
        }
        self.filter_meal_index = meal_id;
        self.filter_diet_index = diet_id;
        // The header keeps describing the shown list until a load succeeds
        self.pending_filter = Some(selection);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use foody::data::{FetchError, QueryParameters, RecipeSource};

    struct OfflineSource;

    #[async_trait]
    impl RecipeSource for OfflineSource {
        async fn fetch(&self, _query: &QueryParameters) -> Result<RecipeResultSet, FetchError> {
            Err(FetchError::NetworkUnavailable)
        }
    }

    /// App backed by in-memory stores and a source that is always offline
    pub fn offline_app() -> App {
        let cache = Arc::new(LocalCache::in_memory());
        let preferences = Arc::new(PreferenceStore::in_memory());
        let retriever = Arc::new(RecipeRetriever::new(
            Arc::new(OfflineSource),
            cache.clone(),
            preferences.clone(),
        ));
        App::new(retriever, preferences, cache)
    }
}
