use std::fmt;
use std::sync::Arc;

/// A temperature or field value that is read afresh on every Metropolis
/// attempt.
#[derive(Clone)]
pub enum Schedule {
    Constant(f64),
    Varying(Arc<dyn Fn() -> f64 + Send + Sync>),
}

impl Schedule {
    pub fn varying(f: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        Self::Varying(Arc::new(f))
    }

    #[inline]
    pub fn current(&self) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::Varying(f) => f(),
        }
    }
}

impl From<f64> for Schedule {
    fn from(v: f64) -> Self {
        Self::Constant(v)
    }
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Self::Varying(_) => f.write_str("Varying(..)"),
        }
    }
}
