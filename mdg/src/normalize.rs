/// Uppercases a raw vendor commodity identifier. MDG's normalization step
/// (spec.md §4.A algorithm, step 1); validation of the resulting id happens
/// in [`pipeline_model::Tick::new`].
pub fn normalize_commodity_id(raw: &str) -> String {
    raw.to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_mixed_case_ids() {
        assert_eq!(normalize_commodity_id("mxFf5"), "MXFF5");
    }
}
