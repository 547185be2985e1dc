//! Basic example of building a static map URL.
//!
//! Run with: cargo run --example basic_url

use std::sync::{Arc, Mutex};
use std::time::Duration;

use static_map_url::{
    polyline, Directions, DirectionsRenderer, DirectionsRoute, LatLng, LiveMap, Marker,
    MarkerStyle, StaticMapBuilder, StaticMapConfig,
};

/// A map showing central London.
struct LondonMap;

impl LiveMap for LondonMap {
    fn div_size(&self) -> (u32, u32) {
        (800, 480)
    }

    fn zoom(&self) -> i32 {
        14
    }

    fn center(&self) -> LatLng {
        LatLng::new(51.5074, -0.1278)
    }

    fn map_type_id(&self) -> String {
        "ROADMAP".to_string()
    }
}

/// Renderer whose directions arrive a little later, like a network request.
struct SlowRenderer {
    directions: Mutex<Option<Directions>>,
}

impl DirectionsRenderer for SlowRenderer {
    fn directions(&self) -> Option<Directions> {
        self.directions.lock().unwrap().clone()
    }

    fn route_index(&self) -> usize {
        0
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let route = vec![
        LatLng::new(51.5074, -0.1278), // Start
        LatLng::new(51.5080, -0.1290),
        LatLng::new(51.5090, -0.1300),
        LatLng::new(51.5100, -0.1310),
        LatLng::new(51.5110, -0.1320), // End
    ];

    println!("Static Map URL Example\n");
    println!("Route encoded: {}\n", polyline::encode(&route));

    let mut builder = StaticMapBuilder::new(LondonMap, StaticMapConfig::default());

    let cafe = MarkerStyle {
        color: Some("blue".to_string()),
        size: Some("small".to_string()),
        ..Default::default()
    };
    builder.markers_mut().add_marker(Marker::new(LatLng::new(51.5085, -0.1260), cafe.clone()));
    builder.markers_mut().add_marker(Marker::new(LatLng::new(51.5060, -0.1300), cafe));
    builder.markers_mut().add_marker(Marker::new(LatLng::new(51.5100, -0.1250), MarkerStyle::default()));

    let renderer = Arc::new(SlowRenderer {
        directions: Mutex::new(None),
    });
    builder.set_route_renderer(renderer.clone());

    let setter = Arc::clone(&renderer);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        *setter.directions.lock().unwrap() = Some(Directions {
            routes: vec![DirectionsRoute { overview_path: route }],
        });
    });

    match builder.prepare_url().await {
        Ok(url) => {
            println!("URL ({} bytes):\n  {}\n", url.len(), url);
            println!("Marker groups: {}", builder.markers().grouped().len());
        }
        Err(e) => println!("Failed to prepare URL: {}", e),
    }
}
