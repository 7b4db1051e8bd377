//! Park registry and air-quality ranking.

use serde::{Deserialize, Serialize};

use crate::aqi::{self, AqiCategory};

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Park {
    pub id: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub best_activity: &'static str,
    /// Miles from the city centre.
    pub distance: f64,
    pub amenities: &'static [&'static str],
    pub difficulty: Difficulty,
}

/// A park together with its latest measured air quality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkConditions {
    #[serde(flatten)]
    pub park: Park,
    pub aqi: u32,
    pub category: AqiCategory,
}

macro_rules! park {
    ($id:expr, $name:expr, ($lat:expr, $lon:expr), $activity:expr, $dist:expr, [$($amenity:expr),*], $difficulty:ident) => {
        Park {
            id: $id,
            name: $name,
            lat: $lat,
            lon: $lon,
            best_activity: $activity,
            distance: $dist,
            amenities: &[$($amenity),*],
            difficulty: Difficulty::$difficulty,
        }
    };
}

pub const CITY_PARKS: &[Park] = &[
    park!("guadalupe-river-trail", "Guadalupe River Trail", (37.3352, -121.8811), "Jogging", 2.1,
          ["Paved trail", "Bike path", "River views", "Dog-friendly"], Easy),
    park!("almaden-quicksilver", "Almaden Quicksilver Park", (37.1677, -121.8233), "Hiking", 8.5,
          ["Trails", "Historic sites", "Scenic views", "Picnic areas"], Moderate),
    park!("kelley-park", "Kelley Park", (37.3235, -121.8622), "Walking", 3.2,
          ["Japanese Garden", "Zoo", "Playgrounds", "BBQ areas"], Easy),
    park!("communications-hill", "Communications Hill Park", (37.2726, -121.8295), "Hiking", 5.7,
          ["Hilltop views", "Trails", "Fitness stations"], Moderate),
    park!("los-gatos-creek-trail", "Los Gatos Creek Trail", (37.2488, -121.9313), "Biking", 6.3,
          ["Paved trail", "Creek views", "Shaded areas", "Wildlife"], Easy),
    park!("alum-rock-park", "Alum Rock Park", (37.3877, -121.7974), "Hiking", 7.8,
          ["Mountain trails", "Creek", "Mineral springs", "Visitor center"], Hard),
    park!("hellyer-county-park", "Hellyer County Park", (37.2847, -121.8133), "Biking", 4.9,
          ["Velodrome", "Bike trails", "Lake", "Picnic areas"], Easy),
    park!("coyote-creek-trail", "Coyote Creek Trail", (37.2585, -121.8180), "Walking", 5.1,
          ["Paved trail", "Creek views", "Bird watching", "Dog-friendly"], Easy),
    park!("overfelt-gardens", "Overfelt Gardens", (37.3709, -121.8436), "Walking", 3.8,
          ["Chinese garden", "Lake", "Wildlife sanctuary", "Trails"], Easy),
    park!("penitencia-creek-park", "Penitencia Creek Park", (37.3948, -121.8258), "Hiking", 6.2,
          ["Creek trails", "Picnic areas", "Playgrounds", "Sports fields"], Moderate),
    park!("martial-cottle-park", "Martial Cottle Park", (37.2676, -121.8394), "Walking", 4.5,
          ["Agricultural park", "Farm animals", "Trails", "Orchards"], Easy),
    park!("lake-cunningham-park", "Lake Cunningham Park", (37.3259, -121.7962), "Biking", 5.4,
          ["Lake", "Skate park", "Bike park", "Fishing"], Easy),
];

/// Combine per-park PM2.5 readings with the registry, best air first.
///
/// Parks with no reading are reported at AQI 0.
pub fn rank_by_air_quality(parks: &[Park], readings: &[(&str, f64)]) -> Vec<ParkConditions> {
    // ---
    let mut ranked: Vec<ParkConditions> = parks
        .iter()
        .map(|park| {
            let aqi = readings
                .iter()
                .find(|(id, _)| *id == park.id)
                .map(|&(_, pm25)| aqi::classify(pm25))
                .unwrap_or(0);
            ParkConditions {
                park: park.clone(),
                aqi,
                category: aqi::categorize(aqi),
            }
        })
        .collect();

    ranked.sort_by_key(|p| p.aqi);
    ranked
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Aqi,
    Distance,
}

/// Explorer filters: free-text search, activity and ordering.
#[derive(Debug, Default, Deserialize)]
pub struct ParkQuery {
    pub q: Option<String>,
    pub activity: Option<String>,
    #[serde(default)]
    pub sort: SortBy,
}

impl ParkQuery {
    // ---
    pub fn apply(&self, parks: &[ParkConditions]) -> Vec<ParkConditions> {
        // ---
        let needle = self.q.as_deref().unwrap_or("").to_lowercase();
        let activity = self.activity.as_deref().filter(|a| *a != "All");

        let mut out: Vec<ParkConditions> = parks
            .iter()
            .filter(|p| {
                p.park.name.to_lowercase().contains(&needle)
                    || p.park.amenities.iter().any(|a| a.to_lowercase().contains(&needle))
            })
            .filter(|p| activity.map_or(true, |a| p.park.best_activity == a))
            .cloned()
            .collect();

        match self.sort {
            SortBy::Aqi => out.sort_by_key(|p| p.aqi),
            SortBy::Distance => out.sort_by(|a, b| a.park.distance.total_cmp(&b.park.distance)),
        }
        out
    }
}

/// Distinct activities in registry order, prefixed with `All`.
pub fn activities(parks: &[ParkConditions]) -> Vec<&'static str> {
    // ---
    let mut out = vec!["All"];
    for p in parks {
        if !out.contains(&p.park.best_activity) {
            out.push(p.park.best_activity);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn ranked() -> Vec<ParkConditions> {
        // ---
        let readings = [
            ("guadalupe-river-trail", 20.0),
            ("kelley-park", 5.0),
            ("alum-rock-park", 40.0),
        ];
        rank_by_air_quality(&CITY_PARKS[..6], &readings)
    }

    #[test]
    fn test_ranking_sorts_by_aqi_and_defaults_missing_to_zero() {
        // ---
        let parks = ranked();
        assert_eq!(parks.len(), 6);

        // Three parks without readings come first at AQI 0, in registry order
        assert_eq!(parks[0].park.id, "almaden-quicksilver");
        assert_eq!(parks[0].aqi, 0);
        assert_eq!(parks[3].park.id, "kelley-park");
        assert_eq!(parks[4].park.id, "guadalupe-river-trail");
        assert_eq!(parks[4].category, AqiCategory::Moderate);
        assert_eq!(parks[5].park.id, "alum-rock-park");
        assert_eq!(parks[5].category, AqiCategory::Sensitive);
    }

    #[test]
    fn test_query_search_matches_name_and_amenities() {
        // ---
        let parks = ranked();
        let q = ParkQuery {
            q: Some("ZOO".into()),
            ..Default::default()
        };
        let hits = q.apply(&parks);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].park.id, "kelley-park");

        let q = ParkQuery {
            q: Some("trail".into()),
            ..Default::default()
        };
        assert!(q.apply(&parks).iter().any(|p| p.park.id == "almaden-quicksilver"));
    }

    #[test]
    fn test_query_activity_and_distance_sort() {
        // ---
        let parks = ranked();
        let q = ParkQuery {
            activity: Some("Hiking".into()),
            sort: SortBy::Distance,
            ..Default::default()
        };
        let ids: Vec<&str> = q.apply(&parks).iter().map(|p| p.park.id).collect();
        assert_eq!(ids, vec!["communications-hill", "alum-rock-park", "almaden-quicksilver"]);

        let all = ParkQuery {
            activity: Some("All".into()),
            ..Default::default()
        };
        assert_eq!(all.apply(&parks).len(), parks.len());
    }

    #[test]
    fn test_activities_are_distinct() {
        // ---
        let parks = rank_by_air_quality(CITY_PARKS, &[]);
        assert_eq!(activities(&parks), vec!["All", "Jogging", "Hiking", "Walking", "Biking"]);
    }
}
