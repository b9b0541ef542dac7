use std::ops::Range;

use crate::error::RenderError;

/// A contiguous run of full-width rows assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBand {
    /// Position of the band in the partition (and of its worker).
    pub index: usize,
    /// First row of the band.
    pub row_begin: u32,
    /// One past the last row of the band.
    pub row_end: u32,
    pub image_width: u32,
    pub image_height: u32,
}

impl RowBand {
    pub fn rows(&self) -> Range<u32> {
        self.row_begin..self.row_end
    }

    pub fn row_count(&self) -> u32 {
        self.row_end - self.row_begin
    }

    /// Inclusive last row, or `None` for an empty band.
    pub fn last_row(&self) -> Option<u32> {
        self.row_end.checked_sub(1).filter(|&r| r >= self.row_begin)
    }

    pub fn pixel_count(&self) -> usize {
        self.row_count() as usize * self.image_width as usize
    }
}

/// Split `height` rows into `workers` bands.
///
/// Every band but the last gets `height / workers` rows; the last one takes
/// the remainder, so the bands cover `0..height` exactly once. With more
/// workers than rows the leading bands are empty.
pub fn partition_rows(width: u32, height: u32, workers: usize) -> Result<Vec<RowBand>, RenderError> {
    if workers == 0 {
        return Err(RenderError::InvalidWorkerCount(workers));
    }
    let n = u32::try_from(workers).map_err(|_| RenderError::InvalidWorkerCount(workers))?;
    let t = height / n;

    let band = |index: u32, row_begin: u32, row_end: u32| RowBand {
        index: index as usize,
        row_begin,
        row_end,
        image_width: width,
        image_height: height,
    };

    let mut bands: Vec<RowBand> = (0..n - 1).map(|i| band(i, i * t, (i + 1) * t)).collect();
    bands.push(band(n - 1, (n - 1) * t, height));
    Ok(bands)
}
