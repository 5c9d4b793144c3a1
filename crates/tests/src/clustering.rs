/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use fleet_optimizer_service::common::{
    clustering::{
        dbscan::{dbscan, region_query},
        epsilon::{adjust_epsilon, MAX_EPSILON, MIN_EPSILON},
        fallback::{fallback_scan, nearest_zone, FALLBACK_ZONES},
        optimizer::{ClusteringConfig, ClusteringOptimizer, ScanOutcome},
        postprocess::{efficiency_gain, optimization_score, recommended_team_size},
        prepare_job_data, prepare_job_data_leniently, ClusteringError, JobPoint,
        DEFAULT_DURATION_MINUTES, DEFAULT_VOLUME,
    },
    types::*,
    utils::euclidean_distance,
    weather::WeatherImpact,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::{json, Value};

const STOCKHOLM: (f64, f64) = (59.3293, 18.0686);

fn optimizer() -> ClusteringOptimizer {
    ClusteringOptimizer::new(
        ClusteringConfig::default(),
        Point::new(STOCKHOLM.0, STOCKHOLM.1),
    )
}

fn job(id: u32, lat: f64, lng: f64) -> Value {
    json!({
        "id": id,
        "lat": lat,
        "lng": lng,
        "estimatedDurationMinutes": 90,
        "volume": 10
    })
}

fn job_point(id: u32, lat: f64, lng: f64) -> JobPoint {
    JobPoint {
        id: JobId(id.to_string()),
        lat: Latitude(lat),
        lng: Longitude(lng),
        estimated_duration_minutes: DEFAULT_DURATION_MINUTES,
        volume: DEFAULT_VOLUME,
        floors: 0,
        has_heavy_items: false,
    }
}

fn random_points(rng: &mut StdRng, count: usize) -> Vec<Point> {
    (0..count)
        .map(|_| {
            Point::new(
                STOCKHOLM.0 + rng.gen_range(-0.05..0.05),
                STOCKHOLM.1 + rng.gen_range(-0.05..0.05),
            )
        })
        .collect()
}

#[test]
fn tight_group_forms_a_single_cluster() {
    let jobs = Value::Array(
        (0..5)
            .map(|i| job(i, 59.33 + f64::from(i) * 0.0002, 18.06 + f64::from(i) * 0.0001))
            .collect(),
    );

    let result = optimizer()
        .try_cluster(&jobs, &WeatherImpact::default())
        .expect("clustering should succeed");

    assert_eq!(result.clusters.len(), 1);
    assert_eq!(result.clusters[0].jobs.len(), 5);
    assert_eq!(result.clusters[0].cluster_id, 1);
    assert_eq!(result.clusters[0].estimated_duration, 450);
    assert!(result.noise.is_empty());
    assert!(!result.fallback);
}

#[test]
fn isolated_points_are_all_noise() {
    let points = vec![
        Point::new(59.0, 18.0),
        Point::new(59.2, 18.0),
        Point::new(59.0, 18.2),
    ];

    let raw = dbscan(&points, 0.008, 2).expect("valid epsilon");

    assert!(raw.clusters.is_empty());
    assert_eq!(raw.noise, vec![0, 1, 2]);
}

#[test]
fn noise_is_never_absorbed_as_a_border_point() {
    let points = vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 0.007),
        Point::new(0.0, 0.014),
    ];

    let raw = dbscan(&points, 0.008, 2).expect("valid epsilon");

    assert_eq!(raw.clusters, vec![vec![1, 2]]);
    assert_eq!(raw.noise, vec![0]);
}

#[test]
fn region_query_excludes_the_point_itself() {
    let points = vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 0.008),
        Point::new(0.0, 0.02),
    ];

    assert_eq!(region_query(&points, 0, 0.008), vec![1]);
    assert_eq!(region_query(&points, 2, 0.008), Vec::<usize>::new());
}

#[test]
fn dbscan_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let points = random_points(&mut rng, 60);

    let first = dbscan(&points, 0.008, 2).expect("valid epsilon");
    let second = dbscan(&points, 0.008, 2).expect("valid epsilon");

    assert_eq!(first, second);
}

#[test]
fn every_point_lands_in_exactly_one_group() {
    let mut rng = StdRng::seed_from_u64(42);
    for count in [0, 1, 2, 15, 80] {
        let points = random_points(&mut rng, count);
        let raw = dbscan(&points, 0.01, 2).expect("valid epsilon");

        let mut seen = raw
            .clusters
            .iter()
            .flatten()
            .chain(raw.noise.iter())
            .copied()
            .collect::<Vec<_>>();
        seen.sort_unstable();

        assert_eq!(seen, (0..count).collect::<Vec<_>>());
    }
}

#[test]
fn clustered_points_are_core_or_reachable_from_a_core_member() {
    let mut rng = StdRng::seed_from_u64(99);
    let (epsilon, min_samples) = (0.01, 2);
    for count in [5, 30, 120] {
        let points = random_points(&mut rng, count);
        let raw = dbscan(&points, epsilon, min_samples).expect("valid epsilon");

        for cluster in &raw.clusters {
            let is_core =
                |index: usize| region_query(&points, index, epsilon).len() >= min_samples;
            let core_members = cluster
                .iter()
                .copied()
                .filter(|index| is_core(*index))
                .collect::<Vec<_>>();
            assert!(!core_members.is_empty(), "cluster {cluster:?} has no core point");

            for &member in cluster {
                assert!(
                    is_core(member)
                        || core_members.iter().any(|core| {
                            euclidean_distance(&points[member], &points[*core]) <= epsilon
                        }),
                    "point {member} is neither core nor within epsilon of a core member"
                );
            }
        }
    }
}

#[test]
fn dbscan_rejects_bad_input() {
    let points = vec![Point::new(59.0, 18.0), Point::new(f64::NAN, 18.0)];

    assert_eq!(
        dbscan(&points, 0.008, 2),
        Err(ClusteringError::NonFiniteCoordinate(1))
    );
    assert_eq!(
        dbscan(&points[..1], 0.0, 2),
        Err(ClusteringError::InvalidEpsilon(0.0))
    );
}

#[test]
fn epsilon_tightens_in_bad_weather() {
    let jobs = vec![job_point(1, 59.33, 18.06), job_point(2, 59.331, 18.061)];
    let mut impact = WeatherImpact::default();

    assert!((adjust_epsilon(0.008, &impact, &jobs) - 0.008).abs() < 1e-12);

    impact.extra_time_minutes = 10;
    assert!((adjust_epsilon(0.008, &impact, &jobs) - 0.0072).abs() < 1e-12);

    impact.extra_time_minutes = 20;
    assert!((adjust_epsilon(0.008, &impact, &jobs) - 0.0064).abs() < 1e-12);
}

#[test]
fn epsilon_loosens_for_sparse_days() {
    let jobs = vec![job_point(1, 59.30, 18.00), job_point(2, 59.36, 18.10)];

    let epsilon = adjust_epsilon(0.008, &WeatherImpact::default(), &jobs);

    assert!((epsilon - 0.0096).abs() < 1e-12);
}

#[test]
fn epsilon_is_always_clamped() {
    let sparse = vec![job_point(1, 59.0, 18.0), job_point(2, 60.0, 19.0)];
    let dense = vec![job_point(1, 59.0, 18.0)];

    for base in [0.0, 0.001, 0.008, 0.02, 1.0, f64::NAN, f64::INFINITY] {
        for extra_time_minutes in [0, 6, 16, 500] {
            let impact = WeatherImpact {
                extra_time_minutes,
                ..WeatherImpact::default()
            };
            for jobs in [&sparse, &dense] {
                let epsilon = adjust_epsilon(base, &impact, jobs);
                assert!(
                    (MIN_EPSILON..=MAX_EPSILON).contains(&epsilon),
                    "epsilon {epsilon} for base {base}"
                );
            }
        }
    }
}

#[test]
fn team_size_grows_with_volume_and_complexity() {
    let mut previous_by_volume = 0;
    for volume in (0..200).map(f64::from) {
        let size = recommended_team_size(volume, 0);
        assert!(size >= previous_by_volume);
        previous_by_volume = size;
    }

    let mut previous_by_complexity = 0;
    for complex_jobs in 0..10 {
        let size = recommended_team_size(30.0, complex_jobs);
        assert!(size >= previous_by_complexity);
        previous_by_complexity = size;
    }

    assert_eq!(recommended_team_size(10.0, 0), 2);
    assert_eq!(recommended_team_size(60.0, 0), 3);
    assert_eq!(recommended_team_size(10.0, 3), 4);
}

#[test]
fn efficiency_gain_is_capped_and_zero_without_clusters() {
    assert_eq!(efficiency_gain(0, 10), 0);
    assert_eq!(efficiency_gain(3, 0), 0);
    assert_eq!(efficiency_gain(1, 5), 95);
    assert_eq!(efficiency_gain(4, 8), 78);
}

#[test]
fn optimization_score_rewards_coverage_and_balance() {
    let optimizer = optimizer();
    let jobs = json!([
        job(1, 59.30, 18.00),
        job(2, 59.3001, 18.0001),
        job(3, 59.3002, 18.0002),
        job(4, 59.40, 18.20),
        job(5, 59.4001, 18.2001),
        job(6, 59.4002, 18.2002),
    ]);
    let balanced = optimizer
        .try_cluster(&jobs, &WeatherImpact::default())
        .expect("clustering should succeed");

    assert_eq!(balanced.clusters.len(), 2);
    assert_eq!(balanced.optimization_score, 100);
    assert_eq!(optimization_score(&balanced.clusters, 3, 9), 77);
    assert_eq!(optimization_score(&[], 0, 0), 0);
}

#[test]
fn non_array_jobs_fall_back_to_zones() {
    let optimizer = optimizer();

    let outcome = optimizer.scan(&json!({"jobs": "oops"}), WeatherImpact::default());
    assert!(matches!(
        outcome,
        ScanOutcome::Fallback {
            reason: ClusteringError::JobsNotArray,
            ..
        }
    ));

    let result = optimizer.optimize(&json!("not an array"), WeatherImpact::default());
    assert!(result.fallback);
    assert_eq!(result.efficiency_gain, 70);
    assert_eq!(result.optimization_score, 70);
    assert!(result.clusters.is_empty());
}

#[test]
fn malformed_job_falls_back_and_keeps_the_other_jobs() {
    let jobs = json!([
        job(1, 59.3293, 18.0686),
        {"lat": 59.3500, "lng": 18.0686},
        "garbage",
    ]);

    let result = optimizer().optimize(&jobs, WeatherImpact::default());

    assert!(result.fallback);
    let zones = result
        .clusters
        .iter()
        .map(|cluster| cluster.zone.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        zones,
        vec![Some("City".to_string()), Some("North".to_string())]
    );
    assert_eq!(result.clusters[1].jobs[0].id, JobId("job-1".to_string()));
}

#[test]
fn fallback_assigns_each_job_to_its_nearest_zone() {
    let jobs = vec![
        job_point(1, 59.3293, 18.0686),
        job_point(2, 59.3450, 18.0686),
        job_point(3, 59.3300, 18.0310),
        job_point(4, 58.0, 16.0),
    ];

    let result = fallback_scan(jobs, WeatherImpact::default());

    assert_eq!(result.clusters.len(), 3);
    let summary = result
        .clusters
        .iter()
        .map(|cluster| {
            (
                cluster.cluster_id,
                cluster.zone.clone().unwrap_or_default(),
                cluster.jobs.len(),
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            (1, "City".to_string(), 1),
            (2, "North".to_string(), 1),
            (3, "West".to_string(), 1)
        ]
    );
    assert_eq!(result.clusters[1].center, FALLBACK_ZONES[1].center());
    assert_eq!(result.noise.len(), 1);
    assert_eq!(result.noise[0].id, JobId("4".to_string()));
}

#[test]
fn nearest_zone_requires_proximity() {
    assert_eq!(nearest_zone(&Point::new(59.3293, 18.0686)), Some(0));
    assert_eq!(nearest_zone(&Point::new(59.345, 18.0686)), Some(1));
    assert_eq!(nearest_zone(&Point::new(59.0, 18.0)), None);
}

#[test]
fn empty_jobs_yield_an_empty_result() {
    let result = optimizer()
        .try_cluster(&json!([]), &WeatherImpact::default())
        .expect("empty input is valid");

    assert!(result.clusters.is_empty());
    assert!(result.noise.is_empty());
    assert_eq!(result.efficiency_gain, 0);
    assert_eq!(result.optimization_score, 0);
}

#[test]
fn job_data_defaults_and_aliases() {
    let center = Point::new(STOCKHOLM.0, STOCKHOLM.1);
    let jobs = json!([
        {"id": "a-1"},
        {
            "id": 2,
            "latitude": "59.34",
            "longitude": 18.07,
            "estimated_duration": "95",
            "volume_m3": 30,
            "floors": 5,
            "pianoCount": 1
        },
        {"id": 3, "estimatedDurationMinutes": -10, "volume": 0, "applianceCount": 0}
    ]);

    let prepared = prepare_job_data(&jobs, &center).expect("valid jobs");

    assert_eq!(prepared[0].id, JobId("a-1".to_string()));
    assert_eq!(prepared[0].point(), center);
    assert_eq!(prepared[0].estimated_duration_minutes, DEFAULT_DURATION_MINUTES);
    assert_eq!(prepared[0].volume, DEFAULT_VOLUME);
    assert!(!prepared[0].is_complex());

    assert_eq!(prepared[1].id, JobId("2".to_string()));
    assert_eq!(prepared[1].lat, Latitude(59.34));
    assert_eq!(prepared[1].lng, Longitude(18.07));
    assert_eq!(prepared[1].estimated_duration_minutes, 95);
    assert_eq!(prepared[1].volume, 30.0);
    assert!(prepared[1].has_heavy_items);
    assert!(prepared[1].is_complex());

    assert_eq!(prepared[2].estimated_duration_minutes, DEFAULT_DURATION_MINUTES);
    assert_eq!(prepared[2].volume, DEFAULT_VOLUME);
    assert!(!prepared[2].has_heavy_items);
}

#[test]
fn job_data_structural_errors() {
    let center = Point::new(STOCKHOLM.0, STOCKHOLM.1);

    assert_eq!(
        prepare_job_data(&json!({"id": 1}), &center),
        Err(ClusteringError::JobsNotArray)
    );
    assert_eq!(
        ClusteringError::JobsNotArray.to_string(),
        "Jobs must be an array"
    );
    assert!(matches!(
        prepare_job_data(&json!([{"id": 1}, {"lat": 59.0}]), &center),
        Err(ClusteringError::MalformedJob(1, _))
    ));
    assert!(prepare_job_data_leniently(&json!("nope"), &center).is_empty());
}
