use swamp_macros::Columns;

#[derive(Debug, Clone, Copy, Columns)]
#[columns(name = "SaturationSeries")]
pub struct Saturation {
    pub wet_fraction: f64,
    pub dry_fraction: f64,
}

fn main() {
    let mut series = SaturationSeries::default();
    series.push(&Saturation { wet_fraction: 0.1, dry_fraction: 0.4 });
    assert_eq!(series.len(), 1);
    assert_eq!(series.dry_fraction, vec![0.4]);
    assert_eq!(Saturation::COLUMN_NAMES, &["wet_fraction", "dry_fraction"]);
}
