//! Interpreter configuration

/// Default cumulative loop budget for one execution
pub const DEFAULT_MAX_LOOP_ITERATIONS: usize = 100_000;

/// Where the pixel window draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Alternate-screen rendering in the controlling terminal
    #[default]
    Terminal,
    /// Keep the pixel model but draw nowhere
    Headless,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Loop iterations allowed across a whole run before `RunawayLoop`
    pub max_loop_iterations: usize,
    pub display: DisplayMode,
    /// Host status lines on stderr
    pub verbose: bool,
    /// Stop the web server after this many requests; `None` serves forever
    pub request_limit: Option<usize>,
}

impl Settings {
    pub fn with_max_loop_iterations(mut self, max: usize) -> Self {
        self.max_loop_iterations = max;
        self
    }

    pub fn with_display(mut self, display: DisplayMode) -> Self {
        self.display = display;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_request_limit(mut self, limit: usize) -> Self {
        self.request_limit = Some(limit);
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_loop_iterations: DEFAULT_MAX_LOOP_ITERATIONS,
            display: DisplayMode::Terminal,
            verbose: false,
            request_limit: None,
        }
    }
}
