use swamp_macros::Columns;

#[derive(Debug, Clone, Copy, Columns)]
pub struct LayerStats {
    pub mean: f64,
    pub max: f64,
    pub valid_cells: f64,
}

fn main() {
    let row = LayerStats { mean: 0.2, max: 0.5, valid_cells: 10.0 };
    let mut cols = LayerStatsColumns::with_capacity(4);
    assert!(cols.is_empty());
    cols.push(&row);
    cols.push(&LayerStats { mean: 0.3, ..row });
    assert_eq!(cols.len(), 2);
    assert_eq!(cols.mean, vec![0.2, 0.3]);
    assert_eq!(cols.column("max"), Some(&[0.5, 0.5][..]));
    assert_eq!(cols.column("median"), None);
    assert_eq!(LayerStats::COLUMN_NAMES, &["mean", "max", "valid_cells"]);

    let names: Vec<&str> = cols.columns().iter().map(|(n, _)| *n).collect();
    assert_eq!(names, LayerStats::COLUMN_NAMES);
}
