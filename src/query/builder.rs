use super::filters::{Flag, Region};

/// Builds the `odb sql` statement counting observations with `flag` set inside `region`.
pub fn build_count_query(flag: Flag, region: Region) -> String {
    let mut query = format!("select count(*) where {}", flag.predicate());

    if let Some(b) = region.bounds() {
        query.push_str(&format!(
            " and lat@hdr >= {} and lat@hdr <= {} and lon@hdr >= {} and lon@hdr <= {}",
            b.lat_min, b.lat_max, b.lon_min, b.lon_max
        ));
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_query_has_no_bounds() {
        assert_eq!(
            build_count_query(Flag::Active, Region::Global),
            "select count(*) where datum_status.active"
        );
    }

    #[test]
    fn test_regional_query() {
        assert_eq!(
            build_count_query(Flag::Rejected, Region::Eur),
            "select count(*) where datum_status.rejected \
             and lat@hdr >= 25 and lat@hdr <= 75 and lon@hdr >= -30 and lon@hdr <= 45"
        );
    }

    #[test]
    fn test_compound_flag() {
        let q = build_count_query(Flag::ThinnedButActive, Region::Sh);
        assert!(q.starts_with("select count(*) where datum_event1.thinned and datum_status.active and"));
        assert!(q.contains("lat@hdr >= -90"));
    }
}
