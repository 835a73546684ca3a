// src/unit/definition.rs

//! User-facing unit definitions.

use std::fmt;

/// Start action: receives the walk's shared arguments.
pub type StartFn<A> = Box<dyn FnMut(&A) -> anyhow::Result<()> + Send>;

/// Stop action: run only while unwinding.
pub type StopFn = Box<dyn FnMut() + Send>;

/// Definition of a unit, built before registration.
///
/// ```
/// use initdag::UnitDef;
///
/// let def: UnitDef<()> = UnitDef::new("http")
///     .after("db")
///     .after("cache")
///     .on_start(|_| Ok(()))
///     .on_stop(|| {});
/// assert_eq!(def.dependencies(), ["db", "cache"]);
/// ```
pub struct UnitDef<A> {
    pub(crate) name: String,
    pub(crate) deps: Vec<String>,
    pub(crate) start: StartFn<A>,
    pub(crate) stop: StopFn,
}

impl<A> UnitDef<A> {
    /// A unit with no dependencies whose start action succeeds and whose stop
    /// action does nothing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deps: Vec::new(),
            start: Box::new(|_| Ok(())),
            stop: Box::new(|| {}),
        }
    }

    /// Declare a dependency. Duplicates are ignored.
    pub fn after(mut self, dep: impl Into<String>) -> Self {
        let dep = dep.into();
        if !self.deps.contains(&dep) {
            self.deps.push(dep);
        }
        self
    }

    /// Declare several dependencies at once.
    pub fn after_all<I, S>(self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        deps.into_iter().fold(self, |def, dep| def.after(dep))
    }

    pub fn on_start<F>(mut self, f: F) -> Self
    where
        F: FnMut(&A) -> anyhow::Result<()> + Send + 'static,
    {
        self.start = Box::new(f);
        self
    }

    pub fn on_stop<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.stop = Box::new(f);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.deps
    }
}

impl<A> fmt::Debug for UnitDef<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitDef")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}
