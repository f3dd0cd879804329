use std::fmt;

use serde::Serialize;

use crate::config::ConfigError;

/// Runs smaller than this go entirely to `train`.
pub const MIN_SPLIT_TOTAL: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Valid,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Valid, Split::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SplitPlan {
    pub train: u32,
    pub valid: u32,
    pub test: u32,
}

impl SplitPlan {
    /// Floors train and valid; test takes whatever is left so the three always sum to `total`.
    pub fn from_ratios(
        total: u32,
        train_ratio: f32,
        valid_ratio: f32,
    ) -> Result<Self, ConfigError> {
        if !(train_ratio >= 0.0 && valid_ratio >= 0.0) {
            return Err(ConfigError::NegativeSplit {
                train: train_ratio,
                valid: valid_ratio,
            });
        }
        if train_ratio + valid_ratio > 1.0 {
            return Err(ConfigError::SplitOverflow(train_ratio + valid_ratio));
        }
        let train = ((total as f32 * train_ratio).floor() as u32).min(total);
        let valid = ((total as f32 * valid_ratio).floor() as u32).min(total - train);
        Ok(Self {
            train,
            valid,
            test: total - train - valid,
        })
    }

    /// The plan a run actually follows: small runs skip splitting.
    pub fn for_run(total: u32, train_ratio: f32, valid_ratio: f32) -> Result<Self, ConfigError> {
        let plan = Self::from_ratios(total, train_ratio, valid_ratio)?;
        if total < MIN_SPLIT_TOTAL {
            return Ok(Self {
                train: total,
                valid: 0,
                test: 0,
            });
        }
        Ok(plan)
    }

    pub fn count(&self, split: Split) -> u32 {
        match split {
            Split::Train => self.train,
            Split::Valid => self.valid,
            Split::Test => self.test,
        }
    }

    pub fn total(&self) -> u32 {
        self.train + self.valid + self.test
    }

    /// Splits in generation order with their image counts.
    pub fn iter(&self) -> impl Iterator<Item = (Split, u32)> + '_ {
        Split::ALL.into_iter().map(|s| (s, self.count(s)))
    }
}
