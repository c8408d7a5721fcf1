//! Why a constraint is delayed.

use crate::completeness::CriticalEdge;
use im::OrdSet;
use std::fmt;
use stx_terms::TermVar;

/// A delayed constraint waits until one of `vars` is instantiated or until
/// its `critical_edge` is complete.
///
/// A delay with neither is re-examined whenever the state changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Delay {
    pub vars: OrdSet<TermVar>,
    pub critical_edge: Option<CriticalEdge>,
}

impl Delay {
    pub fn on_vars(vars: impl IntoIterator<Item = TermVar>) -> Self {
        Delay {
            vars: vars.into_iter().collect(),
            critical_edge: None,
        }
    }

    pub fn on_critical_edge(edge: CriticalEdge) -> Self {
        Delay {
            vars: OrdSet::new(),
            critical_edge: Some(edge),
        }
    }

    /// Whether the delay only waits for variables.
    pub fn is_var_only(&self) -> bool {
        self.critical_edge.is_none()
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, var) in self.vars.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{var}")?;
        }
        f.write_str("]")?;
        if let Some(edge) = &self.critical_edge {
            write!(f, " on {edge}")?;
        }
        Ok(())
    }
}
