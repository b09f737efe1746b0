use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::gen_eval::GenEvalError;

/// Granularity at which CNV calls are compared to the ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CnvScale {
    Gene,
    Arm,
}

impl CnvScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            CnvScale::Gene => "gene",
            CnvScale::Arm => "arm",
        }
    }
}

impl FromStr for CnvScale {
    type Err = GenEvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gene" => Ok(CnvScale::Gene),
            "arm" => Ok(CnvScale::Arm),
            _ => Err(GenEvalError::InvalidValue {
                option: "cnvScale",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CnvScale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CNV event type; each one is benchmarked in its own subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CnvType {
    CopyGain,
    CopyLoss,
    Loh,
}

impl CnvType {
    /// All event types, in the order their jobs are submitted.
    pub const ALL: [CnvType; 3] = [CnvType::CopyGain, CnvType::CopyLoss, CnvType::Loh];

    pub fn as_str(&self) -> &'static str {
        match self {
            CnvType::CopyGain => "copy_gain",
            CnvType::CopyLoss => "copy_loss",
            CnvType::Loh => "loh",
        }
    }

    /// Subdirectory of the XClone output holding the combined
    /// probabilities for this event type.
    pub fn xclone_prob_subdir(&self) -> &'static str {
        match self {
            CnvType::CopyGain => "prob_combine_copygain",
            CnvType::CopyLoss => "prob_combine_copyloss",
            CnvType::Loh => "prob_combine_loh",
        }
    }

    pub fn xclone_prob_dir(&self, xclone_dir: &Path) -> PathBuf {
        xclone_dir.join(self.xclone_prob_subdir())
    }
}

impl FromStr for CnvType {
    type Err = GenEvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "copy_gain" => Ok(CnvType::CopyGain),
            "copy_loss" => Ok(CnvType::CopyLoss),
            "loh" => Ok(CnvType::Loh),
            _ => Err(GenEvalError::InvalidValue {
                option: "cnv_type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CnvType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
