//! Point markers and style-based grouping.
//!
//! The static map service accepts one `markers=` parameter per visual style,
//! followed by every location drawn with that style. Grouping markers that
//! share a style keeps the URL short.

use log::debug;

use crate::LatLng;

/// Visual style of a marker. Unset fields are `None`.
///
/// Two styles are equal iff every field is equal; `None` only equals `None`,
/// so an unset field never matches a field set to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerStyle {
    /// `tiny`, `mid` or `small`
    pub size: Option<String>,
    /// Named color (`green`) or 24-bit hex (`0xFFFFCC`)
    pub color: Option<String>,
    /// Custom icon URL
    pub icon: Option<String>,
    /// Icon shadow URL or `true`/`false`
    pub shadow: Option<String>,
    /// Single uppercase character or digit
    pub label: Option<String>,
}

impl MarkerStyle {
    /// Style-field tokens in serialization order (`color`, `size`, `icon`, `shadow`, `label`).
    fn tokens(&self) -> Vec<String> {
        [
            ("color", &self.color),
            ("size", &self.size),
            ("icon", &self.icon),
            ("shadow", &self.shadow),
            ("label", &self.label),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| format!("{}:{}", key, v)))
        .collect()
    }
}

/// A styled point marker. Immutable once added to a [`MarkerSet`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Marker {
    pub location: LatLng,
    pub style: MarkerStyle,
}

impl Marker {
    pub fn new(location: LatLng, style: MarkerStyle) -> Self {
        Self { location, style }
    }
}

/// Explicit marker options: a location plus every style field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerOptions {
    pub location: LatLng,
    pub size: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub shadow: Option<String>,
    pub label: Option<String>,
}

impl MarkerOptions {
    /// Options with a location and no style.
    pub fn at(location: LatLng) -> Self {
        Self {
            location,
            size: None,
            color: None,
            icon: None,
            shadow: None,
            label: None,
        }
    }
}

impl From<MarkerOptions> for Marker {
    fn from(opts: MarkerOptions) -> Self {
        Marker::new(
            opts.location,
            MarkerStyle {
                size: opts.size,
                color: opts.color,
                icon: opts.icon,
                shadow: opts.shadow,
                label: opts.label,
            },
        )
    }
}

/// A marker shown on the live map.
pub trait LiveMarker {
    fn icon(&self) -> Option<String>;
    fn shadow(&self) -> Option<String>;
    fn position(&self) -> LatLng;
}

/// A non-empty run of markers sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerGroup {
    markers: Vec<Marker>,
}

impl MarkerGroup {
    /// Style shared by every member (read from the first).
    pub fn style(&self) -> &MarkerStyle {
        &self.markers[0].style
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn locations(&self) -> Vec<LatLng> {
        self.markers.iter().map(|m| m.location).collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Partition markers into groups of identical style.
///
/// Greedy first-fit: the first ungrouped marker seeds a group, every later
/// ungrouped marker with an equal style joins it, and the rest carry over in
/// their original order. Style equality is an equivalence relation, so every
/// style ends up in exactly one group and groups appear in order of each
/// style's first occurrence.
///
/// # Example
/// ```
/// use static_map_url::{group_markers, LatLng, Marker, MarkerStyle};
///
/// let blue = MarkerStyle { color: Some("blue".into()), ..Default::default() };
/// let markers: Vec<Marker> = (0..4)
///     .map(|i| Marker::new(LatLng::new(i as f64, 0.0), blue.clone()))
///     .collect();
///
/// let groups = group_markers(&markers);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].len(), 4);
/// ```
pub fn group_markers(markers: &[Marker]) -> Vec<MarkerGroup> {
    let mut groups = Vec::new();
    let mut remaining: Vec<&Marker> = markers.iter().collect();

    while !remaining.is_empty() {
        let seed = remaining[0];
        let (same, rest): (Vec<&Marker>, Vec<&Marker>) = remaining[1..]
            .iter()
            .copied()
            .partition(|m| m.style == seed.style);

        let members = std::iter::once(seed).chain(same).cloned().collect();
        groups.push(MarkerGroup { markers: members });
        remaining = rest;
    }

    debug!("Grouped {} markers into {} groups", markers.len(), groups.len());
    groups
}

/// Serialize one group as a `&markers=` parameter.
///
/// Present style fields come first as `key:value` tokens, then every member
/// location, all separated by `|`.
///
/// # Example
/// ```
/// use static_map_url::{group_markers, group_to_url_param, LatLng, Marker, MarkerStyle};
///
/// let style = MarkerStyle { color: Some("green".into()), label: Some("A".into()), ..Default::default() };
/// let groups = group_markers(&[Marker::new(LatLng::new(1.0, 1.0), style)]);
/// assert_eq!(group_to_url_param(&groups[0]), "&markers=color:green|label:A|1,1");
/// ```
pub fn group_to_url_param(group: &MarkerGroup) -> String {
    if group.markers.is_empty() {
        return String::new();
    }

    let mut param = String::from("&markers=");
    for token in group.style().tokens() {
        param.push_str(&token);
        param.push('|');
    }
    param.push_str(&crate::points_to_url_string(&group.locations()));
    param
}

/// Append-only marker collection for one map.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a marker to the collection.
    pub fn add_marker(&mut self, marker: impl Into<Marker>) {
        self.markers.push(marker.into());
    }

    /// Add a marker taken from the live map. Only icon, shadow and position
    /// carry over; the remaining style fields stay unset.
    pub fn add_live_marker(&mut self, live: &impl LiveMarker) {
        self.markers.push(Marker::new(
            live.position(),
            MarkerStyle {
                icon: live.icon(),
                shadow: live.shadow(),
                ..Default::default()
            },
        ));
    }

    pub fn all(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn grouped(&self) -> Vec<MarkerGroup> {
        group_markers(&self.markers)
    }

    /// All groups serialized in grouping order; empty when there are no markers.
    pub fn to_url_param(&self) -> String {
        self.grouped().iter().map(group_to_url_param).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(color: Option<&str>, label: Option<&str>) -> MarkerStyle {
        MarkerStyle {
            color: color.map(String::from),
            label: label.map(String::from),
            ..Default::default()
        }
    }

    fn marker(lat: f64, lng: f64, s: &MarkerStyle) -> Marker {
        Marker::new(LatLng::new(lat, lng), s.clone())
    }

    struct PinMarker {
        at: LatLng,
    }

    impl LiveMarker for PinMarker {
        fn icon(&self) -> Option<String> {
            Some("http://example.com/pin.png".to_string())
        }

        fn shadow(&self) -> Option<String> {
            None
        }

        fn position(&self) -> LatLng {
            self.at
        }
    }

    #[test]
    fn test_style_equality_treats_unset_uniformly() {
        assert_eq!(MarkerStyle::default(), MarkerStyle::default());
        assert_ne!(style(Some(""), None), style(None, None));
        assert_ne!(style(Some("red"), Some("A")), style(Some("red"), Some("B")));
    }

    #[test]
    fn test_group_empty_and_single() {
        assert!(group_markers(&[]).is_empty());

        let groups = group_markers(&[marker(1.0, 1.0, &MarkerStyle::default())]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 1);
    }

    #[test]
    fn test_group_homogeneous_list() {
        let red = style(Some("red"), None);
        let markers: Vec<Marker> = (0..7).map(|i| marker(i as f64, 0.0, &red)).collect();

        let groups = group_markers(&markers);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].markers(), &markers[..]);
    }

    #[test]
    fn test_group_interleaved_styles() {
        let red = style(Some("red"), None);
        let blue = style(Some("blue"), None);
        let plain = MarkerStyle::default();
        let markers = vec![
            marker(1.0, 0.0, &red),
            marker(2.0, 0.0, &blue),
            marker(3.0, 0.0, &red),
            marker(4.0, 0.0, &plain),
            marker(5.0, 0.0, &blue),
            marker(6.0, 0.0, &red),
        ];

        let groups = group_markers(&markers);
        assert_eq!(groups.len(), 3);

        let lats = |g: &MarkerGroup| g.locations().iter().map(|p| p.latitude).collect::<Vec<_>>();
        assert_eq!(groups[0].style(), &red);
        assert_eq!(lats(&groups[0]), vec![1.0, 3.0, 6.0]);
        assert_eq!(groups[1].style(), &blue);
        assert_eq!(lats(&groups[1]), vec![2.0, 5.0]);
        assert_eq!(groups[2].style(), &plain);
        assert_eq!(lats(&groups[2]), vec![4.0]);
    }

    #[test]
    fn test_group_is_a_style_homogeneous_partition() {
        let styles = [
            style(Some("red"), Some("A")),
            style(Some("red"), None),
            style(None, Some("A")),
            MarkerStyle {
                size: Some("tiny".into()),
                ..Default::default()
            },
        ];
        let markers: Vec<Marker> = (0..20)
            .map(|i| marker(i as f64, 0.0, &styles[(i * 7) % styles.len()]))
            .collect();

        let groups = group_markers(&markers);
        assert_eq!(groups.len(), styles.len());

        let total: usize = groups.iter().map(|g| g.len()).sum();
        assert_eq!(total, markers.len());

        for group in &groups {
            assert!(group.markers().iter().all(|m| &m.style == group.style()));
            // Members keep their relative input order
            let lats: Vec<f64> = group.locations().iter().map(|p| p.latitude).collect();
            assert!(lats.windows(2).all(|w| w[0] < w[1]));
        }
        for m in &markers {
            assert_eq!(groups.iter().filter(|g| g.markers().contains(m)).count(), 1);
        }
    }

    #[test]
    fn test_group_to_url_param_field_order() {
        let full = MarkerStyle {
            size: Some("mid".into()),
            color: Some("0xFFFFCC".into()),
            icon: Some("http://x/i.png".into()),
            shadow: Some("false".into()),
            label: Some("C".into()),
        };
        let groups = group_markers(&[marker(1.5, -2.0, &full), marker(3.0, 4.25, &full)]);
        assert_eq!(
            group_to_url_param(&groups[0]),
            "&markers=color:0xFFFFCC|size:mid|icon:http://x/i.png|shadow:false|label:C|1.5,-2|3,4.25"
        );
    }

    #[test]
    fn test_group_to_url_param_without_style() {
        let groups = group_markers(&[marker(1.0, 2.0, &MarkerStyle::default())]);
        assert_eq!(group_to_url_param(&groups[0]), "&markers=1,2");
    }

    #[test]
    fn test_differing_labels_split_groups() {
        let mut set = MarkerSet::new();
        set.add_marker(marker(1.0, 1.0, &style(Some("green"), Some("A"))));
        set.add_marker(marker(2.0, 2.0, &style(Some("green"), Some("B"))));

        assert_eq!(
            set.to_url_param(),
            "&markers=color:green|label:A|1,1&markers=color:green|label:B|2,2"
        );
    }

    #[test]
    fn test_marker_set_from_options_and_live_marker() {
        let mut set = MarkerSet::new();
        assert!(set.is_empty());
        assert_eq!(set.to_url_param(), "");

        set.add_marker(MarkerOptions {
            color: Some("red".into()),
            ..MarkerOptions::at(LatLng::new(5.0, 6.0))
        });
        set.add_live_marker(&PinMarker { at: LatLng::new(7.0, 8.0) });

        assert_eq!(set.len(), 2);
        assert_eq!(set.all()[0].style.color.as_deref(), Some("red"));
        assert_eq!(set.all()[1].style.icon.as_deref(), Some("http://example.com/pin.png"));
        assert_eq!(set.all()[1].style.color, None);
        assert_eq!(
            set.to_url_param(),
            "&markers=color:red|5,6&markers=icon:http://example.com/pin.png|7,8"
        );
    }
}
