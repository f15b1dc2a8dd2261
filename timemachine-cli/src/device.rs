use async_trait::async_trait;
use timemachine_core::{Coordinates, GeocodedAddress, LocationProvider, PermissionStatus};

/// Location "device" backed by command-line flags.
///
/// Without coordinates it behaves like a refused permission prompt, so the
/// default location is used. Place names come from `--city`/`--district`;
/// when neither is given geocoding yields nothing.
#[derive(Debug, Clone, Default)]
pub struct ArgsLocation {
    pub coords: Option<Coordinates>,
    pub city: Option<String>,
    pub district: Option<String>,
}

#[async_trait]
impl LocationProvider for ArgsLocation {
    async fn request_permission(&self) -> anyhow::Result<PermissionStatus> {
        Ok(match self.coords {
            Some(_) => PermissionStatus::Granted,
            None => PermissionStatus::Denied,
        })
    }

    async fn current_position(&self) -> anyhow::Result<Coordinates> {
        self.coords
            .ok_or_else(|| anyhow::anyhow!("No coordinates given; pass --lat and --lon"))
    }

    async fn reverse_geocode(&self, _coords: Coordinates) -> anyhow::Result<Vec<GeocodedAddress>> {
        if self.city.is_none() && self.district.is_none() {
            return Ok(Vec::new());
        }

        Ok(vec![GeocodedAddress {
            city: self.city.clone(),
            district: self.district.clone(),
            ..GeocodedAddress::default()
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use timemachine_core::{LocationController, LocationPhase, location::default_location};

    #[tokio::test]
    async fn no_coordinates_means_default_location() {
        let ctl = LocationController::new(Arc::new(ArgsLocation::default()));
        assert_eq!(ctl.request_location().await, default_location());
        assert_eq!(ctl.state().phase, LocationPhase::Denied);
    }

    #[tokio::test]
    async fn coordinates_and_city_are_used() {
        let coords = Coordinates { latitude: 35.1796, longitude: 129.0756 };
        let ctl = LocationController::new(Arc::new(ArgsLocation {
            coords: Some(coords),
            city: Some("부산시".into()),
            district: None,
        }));

        let place = ctl.request_location().await;
        assert_eq!(place.city, "부산시");
        assert_eq!(place.district, "강남구");
        assert_eq!(place.coords, coords);
    }
}
