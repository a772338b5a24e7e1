use serde::{Deserialize, Deserializer, Serialize};

/// Pagination envelope used by the backend's list endpoints.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|n| !n.is_empty())
    }

    pub fn has_previous(&self) -> bool {
        self.previous.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}

impl<T> From<Vec<T>> for Page<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            next: None,
            previous: None,
            results,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Wire<T> {
    Envelope {
        #[serde(default)]
        count: Option<usize>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    List(Vec<T>),
}

// Some endpoints are unpaginated and return a bare array.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Wire::deserialize(deserializer)? {
            Wire::Envelope {
                count,
                next,
                previous,
                results,
            } => Ok(Self {
                count: count.unwrap_or(results.len()),
                next,
                previous,
                results,
            }),
            Wire::List(results) => Ok(results.into()),
        }
    }
}
