//! Built-in gazetteers for the coordinate-validation battery.
//!
//! Country capitals, country and state centroids, biodiversity institutions and
//! a coarse land polygon for the Pacific coast of North America. Coordinates are
//! (name, lon, lat) in WGS84.

use crate::index::PointIndex;
use crate::models::BoundingBox;
use crate::transform::meters_per_degree;
use geo::{Coord, Intersects, LineString, Point, Polygon};

/// GBIF Secretariat, Copenhagen
pub const GBIF_HEADQUARTERS: (f64, f64) = (12.58, 55.68);

pub const CAPITALS: &[(&str, f64, f64)] = &[
    ("Washington, D.C.", -77.0369, 38.9072),
    ("Ottawa", -75.6972, 45.4215),
    ("Mexico City", -99.1332, 19.4326),
    ("Guatemala City", -90.5069, 14.6349),
    ("Belmopan", -88.7590, 17.2510),
    ("San Salvador", -89.2182, 13.6929),
    ("Tegucigalpa", -87.2068, 14.0723),
    ("Managua", -86.2362, 12.1150),
    ("San Jose", -84.0907, 9.9281),
    ("Panama City", -79.5199, 8.9824),
    ("Havana", -82.3666, 23.1136),
    ("Kingston", -76.7936, 17.9712),
    ("Port-au-Prince", -72.3074, 18.5944),
    ("Santo Domingo", -69.9312, 18.4861),
    ("Nassau", -77.3504, 25.0443),
    ("Bogota", -74.0721, 4.7110),
    ("Caracas", -66.9036, 10.4806),
    ("Quito", -78.4678, -0.1807),
    ("Lima", -77.0428, -12.0464),
    ("La Paz", -68.1193, -16.4897),
    ("Brasilia", -47.8825, -15.7942),
    ("Asuncion", -57.5759, -25.2637),
    ("Montevideo", -56.1645, -34.9011),
    ("Buenos Aires", -58.3816, -34.6037),
    ("Santiago", -70.6693, -33.4489),
    ("Georgetown", -58.1553, 6.8013),
    ("Paramaribo", -55.2038, 5.8520),
    ("Reykjavik", -21.8174, 64.1265),
    ("Dublin", -6.2603, 53.3498),
    ("London", -0.1276, 51.5072),
    ("Lisbon", -9.1393, 38.7223),
    ("Madrid", -3.7038, 40.4168),
    ("Paris", 2.3522, 48.8566),
    ("Brussels", 4.3517, 50.8503),
    ("Amsterdam", 4.9041, 52.3676),
    ("Luxembourg", 6.1296, 49.8153),
    ("Bern", 7.4474, 46.9480),
    ("Rome", 12.4964, 41.9028),
    ("Berlin", 13.4050, 52.5200),
    ("Copenhagen", 12.5683, 55.6761),
    ("Oslo", 10.7522, 59.9139),
    ("Stockholm", 18.0686, 59.3293),
    ("Helsinki", 24.9384, 60.1699),
    ("Tallinn", 24.7536, 59.4370),
    ("Riga", 24.1052, 56.9496),
    ("Vilnius", 25.2797, 54.6872),
    ("Warsaw", 21.0122, 52.2297),
    ("Prague", 14.4378, 50.0755),
    ("Vienna", 16.3738, 48.2082),
    ("Bratislava", 17.1077, 48.1486),
    ("Budapest", 19.0402, 47.4979),
    ("Ljubljana", 14.5058, 46.0569),
    ("Zagreb", 15.9819, 45.8150),
    ("Belgrade", 20.4489, 44.7866),
    ("Sarajevo", 18.4131, 43.8563),
    ("Podgorica", 19.2594, 42.4304),
    ("Tirana", 19.8187, 41.3275),
    ("Skopje", 21.4254, 41.9981),
    ("Sofia", 23.3219, 42.6977),
    ("Bucharest", 26.1025, 44.4268),
    ("Chisinau", 28.8638, 47.0105),
    ("Kyiv", 30.5234, 50.4501),
    ("Minsk", 27.5615, 53.9045),
    ("Moscow", 37.6173, 55.7558),
    ("Athens", 23.7275, 37.9838),
    ("Ankara", 32.8597, 39.9334),
    ("Tbilisi", 44.8271, 41.7151),
    ("Yerevan", 44.5152, 40.1872),
    ("Baku", 49.8671, 40.4093),
    ("Tehran", 51.3890, 35.6892),
    ("Baghdad", 44.3661, 33.3152),
    ("Damascus", 36.2765, 33.5138),
    ("Beirut", 35.5018, 33.8938),
    ("Amman", 35.9106, 31.9539),
    ("Riyadh", 46.6753, 24.7136),
    ("Cairo", 31.2357, 30.0444),
    ("Tripoli", 13.1913, 32.8872),
    ("Tunis", 10.1815, 36.8065),
    ("Algiers", 3.0588, 36.7538),
    ("Rabat", -6.8498, 33.9716),
    ("Dakar", -17.4677, 14.7167),
    ("Accra", -0.1870, 5.6037),
    ("Abuja", 7.3986, 9.0765),
    ("Addis Ababa", 38.7578, 8.9806),
    ("Nairobi", 36.8219, -1.2921),
    ("Kampala", 32.5825, 0.3476),
    ("Dodoma", 35.7516, -6.1630),
    ("Kinshasa", 15.2663, -4.4419),
    ("Luanda", 13.2344, -8.8390),
    ("Lusaka", 28.3228, -15.3875),
    ("Harare", 31.0530, -17.8252),
    ("Pretoria", 28.2293, -25.7479),
    ("Antananarivo", 47.5079, -18.8792),
    ("Kabul", 69.2075, 34.5553),
    ("Islamabad", 73.0479, 33.6844),
    ("New Delhi", 77.2090, 28.6139),
    ("Kathmandu", 85.3240, 27.7172),
    ("Dhaka", 90.4125, 23.8103),
    ("Colombo", 79.8612, 6.9271),
    ("Naypyidaw", 96.1297, 19.7633),
    ("Bangkok", 100.5018, 13.7563),
    ("Hanoi", 105.8342, 21.0278),
    ("Phnom Penh", 104.9282, 11.5564),
    ("Vientiane", 102.6331, 17.9757),
    ("Kuala Lumpur", 101.6869, 3.1390),
    ("Singapore", 103.8198, 1.3521),
    ("Jakarta", 106.8456, -6.2088),
    ("Manila", 120.9842, 14.5995),
    ("Beijing", 116.4074, 39.9042),
    ("Ulaanbaatar", 106.9057, 47.8864),
    ("Seoul", 126.9780, 37.5665),
    ("Tokyo", 139.6917, 35.6895),
    ("Taipei", 121.5654, 25.0330),
    ("Canberra", 149.1300, -35.2809),
    ("Wellington", 174.7762, -41.2865),
    ("Port Moresby", 147.1803, -9.4438),
    ("Suva", 178.4419, -18.1416),
];

pub const COUNTRY_CENTROIDS: &[(&str, f64, f64)] = &[
    ("United States", -98.5795, 39.8283),
    ("Canada", -106.3468, 56.1304),
    ("Mexico", -102.5528, 23.6345),
    ("Guatemala", -90.2308, 15.7835),
    ("Honduras", -86.2419, 15.1999),
    ("Nicaragua", -85.2072, 12.8654),
    ("Costa Rica", -83.7534, 9.7489),
    ("Panama", -80.7821, 8.5380),
    ("Cuba", -77.7812, 21.5218),
    ("Colombia", -74.2973, 4.5709),
    ("Venezuela", -66.5897, 6.4238),
    ("Ecuador", -78.1834, -1.8312),
    ("Peru", -75.0152, -9.1900),
    ("Bolivia", -63.5887, -16.2902),
    ("Brazil", -51.9253, -14.2350),
    ("Paraguay", -58.4438, -23.4425),
    ("Uruguay", -55.7658, -32.5228),
    ("Argentina", -63.6167, -38.4161),
    ("Chile", -71.5430, -35.6751),
    ("Iceland", -19.0208, 64.9631),
    ("Ireland", -7.6921, 53.1424),
    ("United Kingdom", -3.4360, 55.3781),
    ("Portugal", -8.2245, 39.3999),
    ("Spain", -3.7492, 40.4637),
    ("France", 2.2137, 46.2276),
    ("Germany", 10.4515, 51.1657),
    ("Italy", 12.5674, 41.8719),
    ("Poland", 19.1451, 51.9194),
    ("Sweden", 18.6435, 60.1282),
    ("Norway", 8.4689, 60.4720),
    ("Finland", 25.7482, 61.9241),
    ("Ukraine", 31.1656, 48.3794),
    ("Russia", 105.3188, 61.5240),
    ("Turkey", 35.2433, 38.9637),
    ("China", 104.1954, 35.8617),
    ("India", 78.9629, 20.5937),
    ("Japan", 138.2529, 36.2048),
    ("Indonesia", 113.9213, -0.7893),
    ("Australia", 133.7751, -25.2744),
    ("New Zealand", 174.8860, -40.9006),
    ("South Africa", 22.9375, -30.5595),
    ("Egypt", 30.8025, 26.8206),
    ("Nigeria", 8.6753, 9.0820),
    ("Kenya", 37.9062, -0.0236),
    ("Democratic Republic of the Congo", 21.7587, -4.0383),
    ("Madagascar", 46.8691, -18.7669),
];

/// Geographic centers of the western United States
pub const STATE_CENTROIDS: &[(&str, f64, f64)] = &[
    ("California", -119.4494, 37.1661),
    ("Nevada", -116.6312, 39.3289),
    ("Oregon", -120.5583, 43.9336),
    ("Washington", -120.4472, 47.3826),
    ("Idaho", -114.6130, 44.3509),
    ("Arizona", -111.6602, 34.2744),
    ("Utah", -111.6703, 39.3055),
    ("Baja California", -115.2838, 30.8406),
];

/// Natural history collections and herbaria
pub const INSTITUTIONS: &[(&str, f64, f64)] = &[
    ("Museum of Vertebrate Zoology, Berkeley", -122.2595, 37.8719),
    ("California Academy of Sciences", -122.4661, 37.7699),
    ("Natural History Museum of Los Angeles County", -118.2887, 34.0171),
    ("UC Davis Museum of Wildlife and Fish Biology", -121.7617, 38.5382),
    ("Santa Barbara Museum of Natural History", -119.7138, 34.4413),
    ("San Diego Natural History Museum", -117.1474, 32.7320),
    ("Oakland Museum of California", -122.2637, 37.7986),
    ("Burke Museum", -122.3108, 47.6604),
    ("National Museum of Natural History", -77.0261, 38.8913),
    ("American Museum of Natural History", -73.9740, 40.7813),
    ("Museum of Comparative Zoology", -71.1150, 42.3782),
    ("Field Museum", -87.6169, 41.8663),
    ("Carnegie Museum of Natural History", -79.9495, 40.4433),
    ("University of Kansas Biodiversity Institute", -95.2437, 38.9586),
    ("University of Michigan Museum of Zoology", -83.7335, 42.2780),
    ("Florida Museum of Natural History", -82.3707, 29.6365),
    ("Natural History Museum, London", -0.1764, 51.4967),
    ("Museum fur Naturkunde", 13.3795, 52.5302),
    ("Museum national d'Histoire naturelle", 2.3566, 48.8432),
    ("Naturalis Biodiversity Center", 4.4737, 52.1653),
];

/// Coarse Pacific coastline, north to south, with land to the east
const PACIFIC_COAST: &[[f64; 2]] = &[
    [-124.70, 48.00],
    [-124.10, 46.90],
    [-124.05, 46.25],
    [-123.95, 45.50],
    [-124.05, 44.60],
    [-124.15, 43.70],
    [-124.56, 42.84],
    [-124.21, 41.75],
    [-124.10, 41.00],
    [-124.41, 40.44],
    [-123.85, 39.80],
    [-123.75, 39.00],
    [-123.07, 38.30],
    [-123.02, 37.99],
    [-122.51, 37.78],
    [-122.52, 37.52],
    [-122.39, 37.18],
    [-122.33, 37.11],
    [-122.19, 37.01],
    [-122.06, 36.95],
    [-122.02, 36.96],
    [-121.95, 36.97],
    [-121.91, 36.97],
    [-121.83, 36.89],
    [-121.79, 36.80],
    [-121.95, 36.60],
    [-121.90, 36.30],
    [-121.30, 35.70],
    [-120.87, 35.37],
    [-120.65, 34.90],
    [-120.62, 34.55],
    [-120.47, 34.45],
    [-119.70, 34.40],
    [-119.20, 34.15],
    [-118.80, 34.00],
    [-118.50, 34.03],
    [-118.42, 33.80],
    [-118.10, 33.74],
    [-117.90, 33.60],
    [-117.60, 33.40],
    [-117.30, 33.05],
    [-117.25, 32.85],
    [-117.13, 32.53],
    [-117.00, 32.00],
];

/// Land/sea classification over a limited coverage area
#[derive(Debug, Clone)]
pub struct LandMask {
    coverage: BoundingBox,
    coast: Vec<Coord>,
    land: Polygon,
}

impl LandMask {
    /// The built-in Pacific-coast mask
    pub fn pacific_coast() -> Self {
        let coverage = BoundingBox::new(-128.0, 32.0, -112.0, 48.0);

        let coast: Vec<Coord> = PACIFIC_COAST.iter().map(|c| Coord { x: c[0], y: c[1] }).collect();
        let mut ring = coast.clone();
        ring.push(Coord { x: coverage.max_lon, y: coverage.min_lat });
        ring.push(Coord { x: coverage.max_lon, y: coverage.max_lat });
        ring.push(Coord { x: PACIFIC_COAST[0][0], y: PACIFIC_COAST[0][1] });

        Self { coverage, coast, land: Polygon::new(LineString::new(ring), vec![]) }
    }

    pub fn coverage(&self) -> BoundingBox {
        self.coverage
    }

    /// `Some(true)` on land, `Some(false)` at sea, `None` outside the coverage
    pub fn is_land(&self, lon: f64, lat: f64) -> Option<bool> {
        if !self.coverage.contains(lon, lat) {
            return None;
        }
        Some(self.land.intersects(&Point::new(lon, lat)))
    }

    /// Like [`LandMask::is_land`], but points within `buffer_m` of the coastline count as land
    pub fn is_land_within(&self, lon: f64, lat: f64, buffer_m: f64) -> Option<bool> {
        self.is_land(lon, lat).map(|land| land || self.distance_to_coast_m(lon, lat) <= buffer_m)
    }

    /// Distance to the nearest coastline segment in meters
    ///
    /// Uses an equirectangular projection centred on the query point, which is
    /// accurate to well under a percent at coastal distances.
    pub fn distance_to_coast_m(&self, lon: f64, lat: f64) -> f64 {
        let (m_lon, m_lat) = meters_per_degree(lat);
        let project = |c: &Coord| ((c.x - lon) * m_lon, (c.y - lat) * m_lat);

        self.coast
            .windows(2)
            .map(|pair| distance_to_segment(project(&pair[0]), project(&pair[1])))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Distance from the origin to the segment `a`-`b`
fn distance_to_segment(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq == 0.0 { 0.0 } else { (-(a.0 * dx + a.1 * dy) / length_sq).clamp(0.0, 1.0) };
    (a.0 + t * dx).hypot(a.1 + t * dy)
}

/// Indexed reference data for the validation battery
pub struct ReferenceData {
    pub capitals: PointIndex,
    pub centroids: PointIndex,
    pub institutions: PointIndex,
    pub land: LandMask,
}

impl ReferenceData {
    pub fn builtin() -> Self {
        let centroids: Vec<(&'static str, f64, f64)> =
            COUNTRY_CENTROIDS.iter().chain(STATE_CENTROIDS).copied().collect();

        Self {
            capitals: PointIndex::from_points(CAPITALS),
            centroids: PointIndex::from_points(&centroids),
            institutions: PointIndex::from_points(INSTITUTIONS),
            land: LandMask::pacific_coast(),
        }
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::builtin()
    }
}
