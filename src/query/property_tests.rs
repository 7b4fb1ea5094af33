//! Property-Based Tests for the Query Module
//!
//! Uses proptest to check clamping, filter totals and page coverage.

use proptest::prelude::*;

use chrono::{TimeZone, Utc};

use crate::models::{ListingParams, NewProperty, Property, PropertyStatus};
use crate::query::{PageRequest, PropertyFilter, QueryBuilder, SortField, SortOrder, SortSpec};

// == Strategies ==
fn property_strategy() -> impl Strategy<Value = Property> {
    (
        "[a-f0-9]{8}",
        0u32..2_000_000,
        prop_oneof![Just("Casa"), Just("Departamento"), Just("Terreno")],
        any::<bool>(),
        any::<bool>(),
        0i64..1_000_000,
    )
        .prop_map(|(id, price, kind, for_rent, featured, secs)| {
            let mut new = NewProperty::new(format!("Propiedad {id}"), f64::from(price));
            new.property_type = kind.to_string();
            new.status = Some(if for_rent {
                PropertyStatus::ForRent
            } else {
                PropertyStatus::ForSale
            });
            new.featured = featured;
            let created = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
            Property::from_new(id, new, created)
        })
}

fn filter_strategy() -> impl Strategy<Value = PropertyFilter> {
    (
        prop::option::of(prop_oneof![Just("Casa"), Just("Departamento"), Just("Oficina")]),
        prop::option::of(prop_oneof![Just("En venta"), Just("En alquiler")]),
        prop::option::of(Just(true)),
        prop::option::of(0u32..1_000_000),
        prop::option::of(500_000u32..2_000_000),
    )
        .prop_map(|(kind, status, featured, min, max)| PropertyFilter {
            property_type: kind.map(String::from),
            status: status.map(String::from),
            featured,
            min_price: min.map(f64::from),
            max_price: max.map(f64::from),
        })
}

fn sort_strategy() -> impl Strategy<Value = SortSpec> {
    (
        prop_oneof![
            Just(SortField::CreatedAt),
            Just(SortField::Price),
            Just(SortField::Title),
            Just(SortField::Featured),
        ],
        prop_oneof![Just(SortOrder::Asc), Just(SortOrder::Desc)],
    )
        .prop_map(|(field, order)| SortSpec::new(field, order))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // *For any* page/limit input, the effective page is >= 1 and the
    // effective limit lies in [1, 50].
    #[test]
    fn prop_page_and_limit_clamp(page in any::<i64>(), limit in any::<i64>()) {
        let params = ListingParams {
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
            ..Default::default()
        };
        let spec = QueryBuilder::default().build(&params);
        prop_assert!(spec.page.page >= 1);
        prop_assert!((1..=50).contains(&spec.page.limit));
        if page >= 1 {
            prop_assert_eq!(spec.page.page, page as u64);
        }
        if (1..=50).contains(&limit) {
            prop_assert_eq!(spec.page.limit, limit as u64);
        }
    }

    // *For any* garbage in the numeric parameters, the builder never fails and
    // falls back to defaults.
    #[test]
    fn prop_malformed_numbers_fall_back(page in "[a-z]{1,8}", limit in "[a-z]{1,8}") {
        let params = ListingParams {
            page: Some(page),
            limit: Some(limit),
            ..Default::default()
        };
        let spec = QueryBuilder::default().build(&params);
        prop_assert_eq!(spec.page, PageRequest::new(1, 12));
    }

    // *For any* filter and page, the reported total equals the number of
    // records matching every predicate, independent of pagination.
    #[test]
    fn prop_total_is_independent_of_pagination(
        records in prop::collection::vec(property_strategy(), 0..40),
        filter in filter_strategy(),
        sort in sort_strategy(),
        page in 1u64..6,
        limit in 1u64..15,
    ) {
        let expected = records.iter().filter(|p| filter.matches(p)).count() as u64;
        let spec = crate::query::ListingSpec {
            filter,
            sort,
            page: PageRequest::new(page, limit),
            cacheable: false,
        };
        let (items, total) = spec.apply(&records);
        prop_assert_eq!(total, expected);
        prop_assert!(items.len() as u64 <= limit);
        prop_assert!(items.iter().all(|p| spec.filter.matches(p)));
    }

    // *For any* listing, walking every page yields each matching record exactly once.
    #[test]
    fn prop_pages_partition_matching_records(
        records in prop::collection::vec(property_strategy(), 0..40),
        filter in filter_strategy(),
        limit in 1u64..10,
    ) {
        let mut seen = Vec::new();
        let mut page = 1;
        loop {
            let spec = crate::query::ListingSpec {
                filter: filter.clone(),
                sort: SortSpec::new(SortField::Price, SortOrder::Asc),
                page: PageRequest::new(page, limit),
                cacheable: false,
            };
            let (items, total) = spec.apply(&records);
            seen.extend(items.into_iter().map(|p| p.id));
            if page * limit >= total {
                break;
            }
            page += 1;
        }
        let mut expected: Vec<String> = records
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.id.clone())
            .collect();
        expected.sort();
        seen.sort();
        prop_assert_eq!(seen, expected);
    }
}
