/// Possible canopy model errors.
#[derive(Debug)]
pub enum ModelError {
    /// An input is missing, out of its physical domain, or has the wrong shape
    InvalidParameter(String),
    /// A valid-looking combination the model deliberately does not support
    UnsupportedConfiguration(String),
    /// A crown shape outside the implemented set
    UnsupportedShape(String),
    /// The radiative transfer solve produced non-finite or unphysical values
    NumericalInstability(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidParameter(msg) => {
                write!(f, "invalid parameter: {msg}")
            }
            ModelError::UnsupportedConfiguration(msg) => {
                write!(f, "unsupported configuration: {msg}")
            }
            ModelError::UnsupportedShape(msg) => {
                write!(f, "unsupported crown shape: {msg}")
            }
            ModelError::NumericalInstability(msg) => {
                write!(f, "numerical instability: {msg}")
            }
        }
    }
}

impl std::error::Error for ModelError {}
