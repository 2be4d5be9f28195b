// ---------------------------------------------------------------------------
// Chart request, as driven by the UI widgets
// ---------------------------------------------------------------------------

/// User-chosen hint for which plot-type rule applies to the X/Y pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipMode {
    /// Pick the rule matching the X/Y column types.
    Auto,
    /// numeric X vs numeric Y → scatter.
    OneToOne,
    /// categorical X grouping numeric Y → aggregated bar.
    OneToMany,
    /// categorical X vs categorical Y → co-occurrence heatmap.
    ManyToMany,
}

impl RelationshipMode {
    pub const ALL: [RelationshipMode; 4] = [
        RelationshipMode::Auto,
        RelationshipMode::OneToOne,
        RelationshipMode::OneToMany,
        RelationshipMode::ManyToMany,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RelationshipMode::Auto => "Auto",
            RelationshipMode::OneToOne => "One-to-One",
            RelationshipMode::OneToMany => "One-to-Many",
            RelationshipMode::ManyToMany => "Many-to-Many",
        }
    }
}

/// Reducer applied per distinct X value over Y when building a bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Count,
    Sum,
    Mean,
    Min,
    Max,
}

impl Aggregation {
    pub const ALL: [Aggregation; 5] = [
        Aggregation::Count,
        Aggregation::Sum,
        Aggregation::Mean,
        Aggregation::Min,
        Aggregation::Max,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Aggregation::Count => "count",
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }

    /// Reduce the numeric Y values of one group. `None` when the reducer
    /// needs values and the group has none.
    pub fn reduce(self, values: &[f64], group_rows: usize) -> Option<f64> {
        match self {
            Aggregation::Count => Some(group_rows as f64),
            Aggregation::Sum => {
                if values.is_empty() {
                    None
                } else {
                    Some(values.iter().sum())
                }
            }
            Aggregation::Mean => {
                if values.is_empty() {
                    None
                } else {
                    Some(values.iter().sum::<f64>() / values.len() as f64)
                }
            }
            Aggregation::Min => values.iter().copied().reduce(f64::min),
            Aggregation::Max => values.iter().copied().reduce(f64::max),
        }
    }
}

/// Everything the chart builder needs: the chosen columns plus
/// presentational parameters passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub x: String,
    pub y: String,
    pub mode: RelationshipMode,
    pub aggregation: Aggregation,
    pub color_by: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Plot height in pixels.
    pub height: f32,
}

impl ChartSpec {
    pub fn new(x: impl Into<String>, y: impl Into<String>, mode: RelationshipMode) -> Self {
        ChartSpec {
            x: x.into(),
            y: y.into(),
            mode,
            aggregation: Aggregation::Count,
            color_by: None,
            x_label: None,
            y_label: None,
            height: 500.0,
        }
    }

    pub fn x_label(&self) -> &str {
        self.x_label.as_deref().unwrap_or(&self.x)
    }

    pub fn y_label(&self) -> &str {
        self.y_label.as_deref().unwrap_or(&self.y)
    }
}
