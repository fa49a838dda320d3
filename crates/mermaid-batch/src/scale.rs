//! Mapping from the requested resolution to the renderer's size argument.
//!
//! The Mermaid CLI has no notion of PPI. It accepts either a device scale
//! factor (`-s`) or a page width in pixels (`-w`). [`ScalePolicy`] makes the
//! conversion from a PPI value to one of those arguments explicit:
//!
//! | policy              | argument | 72 PPI | 150 PPI              | 300 PPI             |
//! |---------------------|----------|--------|----------------------|---------------------|
//! | [`ScalePolicy::Ppi`]   | `-s`     | `1`    | `2.0833333333333335` | `4.166666666666667` |
//! | `Width { factor: 3 }` | `-w`     | `216`  | `450`                | `900`               |

/// Resolution at which the renderer's scale factor of `1` is assumed to render.
pub const BASELINE_PPI: f64 = 72.0;

/// Default multiplier for [`ScalePolicy::Width`].
pub const DEFAULT_WIDTH_FACTOR: u32 = 3;

/// Policy deriving the renderer's size argument from a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalePolicy {
    /// Treat the resolution as PPI and pass `resolution / 72` as the scale factor.
    #[default]
    Ppi,
    /// Pass `resolution * factor` as the page width in pixels.
    Width { factor: u32 },
}

impl ScalePolicy {
    /// Derives the argument passed to the renderer for `resolution`.
    pub fn derive(self, resolution: u32) -> ScaleArg {
        match self {
            Self::Ppi => ScaleArg::Scale(f64::from(resolution) / BASELINE_PPI),
            Self::Width { factor } => ScaleArg::Width(u64::from(resolution) * u64::from(factor)),
        }
    }
}

/// A size argument ready to be passed on the renderer's command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleArg {
    /// Device scale factor (`-s`).
    Scale(f64),
    /// Page width in pixels (`-w`).
    Width(u64),
}

impl ScaleArg {
    /// Returns the flag and its value, e.g. `["-s", "4.166666666666667"]`.
    pub fn to_args(self) -> [String; 2] {
        match self {
            Self::Scale(scale) => ["-s".to_string(), scale.to_string()],
            Self::Width(width) => ["-w".to_string(), width.to_string()],
        }
    }
}
