#![allow(dead_code)]

use initdag::UnitDef;

use crate::journal::{Call, Journal};

/// Builder for journaled test units.
///
/// Start and stop actions record themselves in the shared [`Journal`]; the
/// start action fails when built with [`UnitBuilder::failing`].
pub struct UnitBuilder {
    name: String,
    deps: Vec<String>,
    fails: bool,
}

impl UnitBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            deps: Vec::new(),
            fails: false,
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.deps.push(dep.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fails = true;
        self
    }

    pub fn build<A: 'static>(self, journal: &Journal) -> UnitDef<A> {
        let start_journal = journal.clone();
        let stop_journal = journal.clone();
        let start_name = self.name.clone();
        let stop_name = self.name.clone();
        let fails = self.fails;

        UnitDef::new(self.name)
            .after_all(self.deps)
            .on_start(move |_: &A| {
                start_journal.record(Call::Start(start_name.clone()));
                if fails {
                    anyhow::bail!("{start_name} refused to start");
                }
                Ok(())
            })
            .on_stop(move || stop_journal.record(Call::Stop(stop_name.clone())))
    }
}

/// Shorthand: a succeeding unit with the given dependencies.
pub fn ok_unit<A: 'static>(journal: &Journal, name: &str, deps: &[&str]) -> UnitDef<A> {
    deps.iter()
        .fold(UnitBuilder::new(name), |b, dep| b.after(dep))
        .build(journal)
}

/// Shorthand: a unit whose start action fails.
pub fn failing_unit<A: 'static>(journal: &Journal, name: &str, deps: &[&str]) -> UnitDef<A> {
    deps.iter()
        .fold(UnitBuilder::new(name).failing(), |b, dep| b.after(dep))
        .build(journal)
}
