use std::fmt;

/// Ordered scalars produced by an analysis (positions or integral values).
/// `values == None` means nothing was found; at the external boundary this becomes the
/// one-element NaN list.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub values: Option<Vec<f64>>,
}

impl AnalysisResult {
    pub fn found(values: Vec<f64>) -> Self {
        if values.is_empty() {
            Self::nothing()
        } else {
            AnalysisResult {
                values: Some(values),
            }
        }
    }

    pub fn nothing() -> Self {
        AnalysisResult { values: None }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_none()
    }

    pub fn len(&self) -> usize {
        self.values.as_ref().map_or(0, |v| v.len())
    }

    /// External form: the values, or `[NaN]` when nothing was found.
    pub fn to_vec(&self) -> Vec<f64> {
        match &self.values {
            Some(values) => values.clone(),
            None => vec![f64::NAN],
        }
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.values {
            None => write!(f, "nan"),
            Some(values) => {
                let parts: Vec<String> = values.iter().map(|v| format!("{}", v)).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}
