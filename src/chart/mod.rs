/// Chart layer: the user's chart request and the data prepared from it.
///
/// `spec` holds the widget-driven request (columns, relationship mode,
/// aggregation, presentation options); `build` validates it against the
/// column classification and turns the filtered view into plot-ready data.

pub mod build;
pub mod spec;
