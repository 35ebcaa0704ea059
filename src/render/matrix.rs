//! Encoded QR matrix with module classification.

use qrcode::{Color, QrCode};

use crate::error::RenderError;
use crate::options::ErrorCorrection;

/// Side length of a finder pattern, in modules.
pub const FINDER_SIZE: usize = 7;

/// What a module position belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleRole {
    /// The 7x7 ring of a finder pattern.
    CornerSquare,
    /// The 3x3 centre of a finder pattern.
    CornerDot,
    /// Anything else.
    Data,
}

/// Dark/light state of the four orthogonal neighbours of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Neighbors {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Neighbors {
    pub fn count(self) -> usize {
        [self.left, self.right, self.top, self.bottom]
            .into_iter()
            .filter(|&dark| dark)
            .count()
    }
}

/// A square module grid, indexed as `(x, y)` from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    data: String,
    level: ErrorCorrection,
    count: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    /// Encodes `data` at the given error correction level.
    pub fn encode(data: &str, level: ErrorCorrection) -> Result<Self, RenderError> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), level.into())?;
        let count = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();

        Ok(Self {
            data: data.to_string(),
            level,
            count,
            modules,
        })
    }

    /// Returns true if this matrix was encoded from exactly these inputs.
    pub fn matches(&self, data: &str, level: ErrorCorrection) -> bool {
        self.level == level && self.data == data
    }

    /// Modules per side.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns true for a dark module. Positions outside the grid are light.
    pub fn is_dark(&self, x: isize, y: isize) -> bool {
        let count = self.count as isize;
        if x < 0 || y < 0 || x >= count || y >= count {
            return false;
        }
        self.modules[y as usize * self.count + x as usize]
    }

    /// Classifies a position as finder ring, finder centre, or data.
    pub fn role(&self, x: usize, y: usize) -> ModuleRole {
        for (ox, oy) in self.finder_origins() {
            if x < ox || y < oy || x >= ox + FINDER_SIZE || y >= oy + FINDER_SIZE {
                continue;
            }
            let (dx, dy) = (x - ox, y - oy);
            if (2..=4).contains(&dx) && (2..=4).contains(&dy) {
                return ModuleRole::CornerDot;
            }
            return ModuleRole::CornerSquare;
        }
        ModuleRole::Data
    }

    /// Origins of the three finder patterns, in modules.
    pub fn finder_origins(&self) -> [(usize, usize); 3] {
        let far = self.count.saturating_sub(FINDER_SIZE);
        [(0, 0), (far, 0), (0, far)]
    }

    /// Neighbour state of `(x, y)`, treating positions rejected by `visible`
    /// as light.
    pub fn neighbors(
        &self,
        x: usize,
        y: usize,
        visible: impl Fn(usize, usize) -> bool,
    ) -> Neighbors {
        let probe = |dx: isize, dy: isize| {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            self.is_dark(nx, ny) && visible(nx as usize, ny as usize)
        };
        Neighbors {
            left: probe(-1, 0),
            right: probe(1, 0),
            top: probe(0, -1),
            bottom: probe(0, 1),
        }
    }
}
