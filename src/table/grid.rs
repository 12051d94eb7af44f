//! Table grid reconstruction from row/column/spanning-cell detections.
//!
//! A structure detector reports boxes for whole tables, rows, header rows,
//! columns and merged cells. This module groups them into table regions,
//! intersects rows with columns to form the base grid, folds merged cells in
//! on top, and fills the remaining intersections with 1x1 cells.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::geometry::{is_contained, is_same_box, overlap_x, overlap_y, Rect};
use crate::model::{DetectedRegion, GridCell, ImageSize, RegionKind, Table};

/// Grid reconstruction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Minimum score for tables, rows, header rows and columns
    pub min_score: f32,
    /// Minimum score for spanning cells (the detector under-scores them)
    pub min_span_score: f32,
    /// Fraction of a sub-box that must lie inside a table region
    pub containment_ratio: f32,
    /// Overlap fraction for a spanning cell to cover a row or column
    pub span_overlap_ratio: f32,
    /// Row-cluster break: gap relative to the previous row height
    pub cluster_gap_factor: f32,
    /// Row-cluster break: minimum gap in pixels
    pub cluster_min_gap: f32,
    /// Padding around a synthesized table region (pixels)
    pub cluster_padding: f32,
    /// Per-edge tolerance when matching a row against a header row (pixels)
    pub header_tolerance: f32,
    /// Margin added around each cell crop sent to OCR (pixels)
    pub crop_padding: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_score: 0.5,
            min_span_score: 0.1,
            containment_ratio: 0.5,
            span_overlap_ratio: 0.5,
            cluster_gap_factor: 1.5,
            cluster_min_gap: 50.0,
            cluster_padding: 10.0,
            header_tolerance: 2.0,
            crop_padding: 12,
        }
    }
}

impl GridConfig {
    /// Set the score thresholds.
    pub fn with_scores(mut self, min_score: f32, min_span_score: f32) -> Self {
        self.min_score = min_score;
        self.min_span_score = min_span_score;
        self
    }

    /// Set the OCR crop padding.
    pub fn with_crop_padding(mut self, padding: u32) -> Self {
        self.crop_padding = padding;
        self
    }
}

/// Detections for one page, split by kind and sorted.
#[derive(Debug, Default)]
struct DetectionSet {
    tables: Vec<Rect>,
    rows: Vec<Rect>,
    header_rows: Vec<Rect>,
    columns: Vec<Rect>,
    spans: Vec<(Rect, f32)>,
}

/// Detections that fall inside one table region.
struct RegionContents<'a> {
    rows: Vec<&'a Rect>,
    columns: Vec<&'a Rect>,
    spans: Vec<&'a Rect>,
}

/// Builds normalized cell grids from raw detections.
#[derive(Debug, Clone, Default)]
pub struct GridReconstructor {
    config: GridConfig,
}

impl GridReconstructor {
    /// Create a reconstructor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reconstructor with custom configuration.
    pub fn with_config(config: GridConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Reconstruct every table on a page.
    ///
    /// Returns tables in top-to-bottom region order; regions that yield no
    /// usable grid are dropped.
    pub fn reconstruct(&self, detections: &[DetectedRegion], image: ImageSize) -> Vec<Table> {
        let set = self.partition(detections);
        log::debug!(
            "GridReconstructor: {} tables, {} rows ({} header), {} columns, {} spans",
            set.tables.len(),
            set.rows.len(),
            set.header_rows.len(),
            set.columns.len(),
            set.spans.len()
        );

        let regions = self.table_regions(&set, image);
        log::debug!("GridReconstructor: {} table regions", regions.len());

        regions
            .into_iter()
            .filter_map(|region| self.build_table(&set, region))
            .collect()
    }

    /// Table regions the detections resolve to, before grid building.
    pub fn regions(&self, detections: &[DetectedRegion], image: ImageSize) -> Vec<Rect> {
        let set = self.partition(detections);
        self.table_regions(&set, image)
    }

    /// Step 1: filter by score, split by kind, sort.
    fn partition(&self, detections: &[DetectedRegion]) -> DetectionSet {
        let mut set = DetectionSet::default();

        for det in detections {
            let threshold = match det.kind {
                RegionKind::SpanningCell => self.config.min_span_score,
                _ => self.config.min_score,
            };
            if det.score < threshold {
                continue;
            }
            match det.kind {
                RegionKind::Table => set.tables.push(det.bbox),
                RegionKind::Row => set.rows.push(det.bbox),
                RegionKind::RowHeader => set.header_rows.push(det.bbox),
                RegionKind::Column => set.columns.push(det.bbox),
                RegionKind::SpanningCell => set.spans.push((det.bbox, det.score)),
            }
        }

        // A header box doubles as a row only when no row was detected there.
        let tolerance = self.config.header_tolerance;
        for header in &set.header_rows {
            if !set.rows.iter().any(|r| is_same_box(r, header, tolerance)) {
                set.rows.push(*header);
            }
        }

        set.rows.sort_by(|a, b| cmp_f32(a.center_y(), b.center_y()));
        set.columns.sort_by(|a, b| cmp_f32(a.center_x(), b.center_x()));
        set.tables.sort_by(|a, b| cmp_f32(a.y0, b.y0));
        set.spans.sort_by(|a, b| cmp_f32(b.1, a.1));
        set
    }

    /// Step 2: explicit table boxes, else row clusters, else the whole image.
    fn table_regions(&self, set: &DetectionSet, image: ImageSize) -> Vec<Rect> {
        let (w, h) = (image.width as f32, image.height as f32);

        let mut regions: Vec<Rect> = set.tables.iter().map(|t| t.clamp_to(w, h)).collect();

        if regions.is_empty() && !set.rows.is_empty() {
            regions = self
                .cluster_rows(&set.rows)
                .into_iter()
                .map(|r| r.expand(self.config.cluster_padding).clamp_to(w, h))
                .collect();
            log::debug!(
                "GridReconstructor: no table box, synthesized {} regions from rows",
                regions.len()
            );
        }

        if regions.is_empty() && !set.rows.is_empty() && !set.columns.is_empty() {
            regions.push(image.bounds());
        }

        regions.retain(|r| !r.is_empty());
        regions
    }

    /// Group vertically sorted rows into clusters separated by large gaps.
    fn cluster_rows(&self, rows: &[Rect]) -> Vec<Rect> {
        let mut clusters: Vec<Rect> = Vec::new();
        let mut prev: Option<&Rect> = None;

        for row in rows {
            let starts_new = match prev {
                None => true,
                Some(p) => {
                    let gap = row.y0 - p.y1;
                    let limit =
                        (self.config.cluster_gap_factor * p.height()).max(self.config.cluster_min_gap);
                    gap > limit
                }
            };

            if starts_new {
                clusters.push(*row);
            } else if let Some(current) = clusters.last_mut() {
                *current = current.union(row);
            }
            prev = Some(row);
        }

        clusters
    }

    /// Step 3: sub-boxes mostly inside the region.
    fn contents<'a>(&self, set: &'a DetectionSet, region: &Rect) -> RegionContents<'a> {
        let ratio = self.config.containment_ratio;
        RegionContents {
            rows: set.rows.iter().filter(|r| is_contained(r, region, ratio)).collect(),
            columns: set
                .columns
                .iter()
                .filter(|c| is_contained(c, region, ratio))
                .collect(),
            spans: set
                .spans
                .iter()
                .map(|(s, _)| s)
                .filter(|s| is_contained(s, region, ratio))
                .collect(),
        }
    }

    /// Steps 3-8 for one region.
    fn build_table(&self, set: &DetectionSet, region: Rect) -> Option<Table> {
        let contents = self.contents(set, &region);
        let (rows, columns) = (&contents.rows, &contents.columns);

        if rows.is_empty() || columns.is_empty() {
            log::debug!(
                "GridReconstructor: region {:?} skipped ({} rows, {} columns)",
                region,
                rows.len(),
                columns.len()
            );
            return None;
        }

        // Step 4: base grid of row x column intersections.
        let base: Vec<Vec<Option<Rect>>> = rows
            .iter()
            .map(|row| columns.iter().map(|col| row.intersection(col)).collect())
            .collect();

        // Step 7 (computed up front): header rows.
        let is_header: Vec<bool> = rows
            .iter()
            .map(|row| {
                set.header_rows
                    .iter()
                    .any(|h| is_same_box(row, h, self.config.header_tolerance))
            })
            .collect();

        let mut consumed = vec![vec![false; columns.len()]; rows.len()];
        let mut cells = Vec::new();

        // Step 5: spanning cells claim their covered range first.
        for span in &contents.spans {
            let Some(cell) = self.resolve_span(span, rows, columns, &base, &consumed) else {
                continue;
            };
            for (r, c) in cell.positions() {
                consumed[r][c] = true;
            }
            let header = is_header[cell.row];
            cells.push(cell.with_header(header));
        }

        // Step 6: every unclaimed intersection becomes a 1x1 cell.
        for (r, row) in rows.iter().enumerate() {
            for (c, col) in columns.iter().enumerate() {
                if consumed[r][c] {
                    continue;
                }
                let bbox = base[r][c].unwrap_or(Rect::new(col.x0, row.y0, col.x1, row.y1));
                cells.push(GridCell::new(r, c, bbox).with_header(is_header[r]));
            }
        }

        if cells.is_empty() {
            return None;
        }

        log::debug!(
            "GridReconstructor: {}x{} grid, {} cells",
            rows.len(),
            columns.len(),
            cells.len()
        );

        // Step 8: reading order.
        Some(Table::new(cells, rows.len(), columns.len(), region))
    }

    /// Map one spanning-cell box onto the grid.
    fn resolve_span(
        &self,
        span: &Rect,
        rows: &[&Rect],
        columns: &[&Rect],
        base: &[Vec<Option<Rect>>],
        consumed: &[Vec<bool>],
    ) -> Option<GridCell> {
        let ratio = self.config.span_overlap_ratio;
        let covered_rows: Vec<usize> = (0..rows.len())
            .filter(|&i| overlap_y(span, rows[i]) > ratio)
            .collect();
        let covered_cols: Vec<usize> = (0..columns.len())
            .filter(|&i| overlap_x(span, columns[i]) > ratio)
            .collect();

        let (r0, r1) = (*covered_rows.iter().min()?, *covered_rows.iter().max()?);
        let (c0, c1) = (*covered_cols.iter().min()?, *covered_cols.iter().max()?);

        let claimed = (r0..=r1).any(|r| (c0..=c1).any(|c| consumed[r][c]));
        if claimed {
            log::warn!(
                "GridReconstructor: spanning cell rows {}..={} cols {}..={} overlaps a claimed cell, skipped",
                r0,
                r1,
                c0,
                c1
            );
            return None;
        }

        let bbox = Rect::enclosing(
            (r0..=r1).flat_map(|r| (c0..=c1).filter_map(move |c| base[r][c].as_ref())),
        )
        .unwrap_or(*span);

        Some(GridCell::new(r0, c0, bbox).with_span(r1 - r0 + 1, c1 - c0 + 1))
    }
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
