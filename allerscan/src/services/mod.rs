mod scan;

pub use scan::{parse_allergen_list, ScanService};
