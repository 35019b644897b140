//! Geographic coordinates and the input shapes accepted for them.
//!
//! Point queries take anything implementing [`ToLatLng`]:
//!
//! - a [`LatLng`] value,
//! - a `(lat, lng)` tuple,
//! - a `[lat, lng]` array,
//! - any caller type carrying latitude/longitude (implement [`ToLatLng`] for it),
//! - a reference to any of the above.
//!
//! [`LatLng`] also deserializes from either `{"lat": .., "lng": ..}` or
//! `[lat, lng]`, which covers the coordinate objects emitted by common web
//! mapping libraries.

use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees (EPSG:4326 axis meaning).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "LatLngRepr")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Wire shapes a coordinate may arrive in.
#[derive(Deserialize)]
#[serde(untagged)]
enum LatLngRepr {
    Object {
        lat: f64,
        #[serde(alias = "lon")]
        lng: f64,
    },
    Pair([f64; 2]),
}

impl From<LatLngRepr> for LatLng {
    fn from(repr: LatLngRepr) -> Self {
        match repr {
            LatLngRepr::Object { lat, lng } => LatLng { lat, lng },
            LatLngRepr::Pair([lat, lng]) => LatLng { lat, lng },
        }
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        LatLng { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        LatLng { lat, lng }
    }
}

/// Conversion of a caller's coordinate representation into a [`LatLng`].
///
/// Tuples and arrays are read as `(lat, lng)`, latitude first.
pub trait ToLatLng {
    fn to_lat_lng(&self) -> LatLng;
}

impl ToLatLng for LatLng {
    fn to_lat_lng(&self) -> LatLng {
        *self
    }
}

impl ToLatLng for (f64, f64) {
    fn to_lat_lng(&self) -> LatLng {
        LatLng::from(*self)
    }
}

impl ToLatLng for [f64; 2] {
    fn to_lat_lng(&self) -> LatLng {
        LatLng::from(*self)
    }
}

impl<T: ToLatLng + ?Sized> ToLatLng for &T {
    fn to_lat_lng(&self) -> LatLng {
        (**self).to_lat_lng()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker {
        lat: f64,
        lng: f64,
    }

    impl ToLatLng for Marker {
        fn to_lat_lng(&self) -> LatLng {
            LatLng::new(self.lat, self.lng)
        }
    }

    #[test]
    fn test_shapes_agree() {
        let expected = LatLng::new(49.5, 10.5);

        assert_eq!((49.5, 10.5).to_lat_lng(), expected);
        assert_eq!([49.5, 10.5].to_lat_lng(), expected);
        assert_eq!(expected.to_lat_lng(), expected);
        assert_eq!(Marker { lat: 49.5, lng: 10.5 }.to_lat_lng(), expected);
        assert_eq!((&expected).to_lat_lng(), expected);
    }

    #[test]
    fn test_deserialize_object_and_pair() {
        let object: LatLng = serde_json::from_str(r#"{"lat": 49.5, "lng": 10.5}"#).unwrap();
        let pair: LatLng = serde_json::from_str("[49.5, 10.5]").unwrap();
        let lon_alias: LatLng = serde_json::from_str(r#"{"lat": 49.5, "lon": 10.5}"#).unwrap();

        assert_eq!(object, pair);
        assert_eq!(object, lon_alias);
        assert_eq!(object, LatLng::new(49.5, 10.5));
    }

    #[test]
    fn test_deserialize_rejects_other_shapes() {
        assert!(serde_json::from_str::<LatLng>("[49.5]").is_err());
        assert!(serde_json::from_str::<LatLng>(r#"{"x": 1.0, "y": 2.0}"#).is_err());
        assert!(serde_json::from_str::<LatLng>("49.5").is_err());
    }

    #[test]
    fn test_serialize_as_object() {
        let json = serde_json::to_string(&LatLng::new(1.5, 2.5)).unwrap();
        assert_eq!(json, r#"{"lat":1.5,"lng":2.5}"#);
    }
}
