use crate::error::RoutingError;
use crate::models::{Cost, Location};
use crate::oracle::{DistanceProvider, TravelMode};
use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

/// Road network graph structure
pub struct RoadNetwork {
    graph: UnGraph<Location, Cost>, // Vertex -> coordinates, edge -> length in miles
}

impl RoadNetwork {
    /// Create a new road network from vertex coordinates and undirected edges.
    /// Edges referring to unknown vertices are ignored.
    pub fn new(vertices: &HashMap<u64, Location>, edges: &[(u64, u64)]) -> Self {
        let mut graph = UnGraph::new_undirected();

        // Insert vertices in id order so node indices are reproducible
        let mut ids: Vec<&u64> = vertices.keys().collect();
        ids.sort();
        let index: HashMap<u64, NodeIndex> = ids
            .into_iter()
            .map(|id| (*id, graph.add_node(vertices[id])))
            .collect();

        for (start_id, end_id) in edges {
            if let (Some(&a), Some(&b)) = (index.get(start_id), index.get(end_id)) {
                let length = graph[a].haversine_miles(&graph[b]);
                graph.add_edge(a, b, length);
            }
        }

        RoadNetwork { graph }
    }

    /// Load a road network from whitespace-separated text files:
    /// vertices as `id lng lat`, edges as `id start_id end_id`
    pub fn load<P: AsRef<Path>>(vertices_path: P, edges_path: P) -> Result<Self, io::Error> {
        let mut vertices = HashMap::new();
        for parts in read_rows(vertices_path.as_ref(), 3)? {
            vertices.insert(
                parse_field(&parts[0])?,
                Location::new(parse_field(&parts[1])?, parse_field(&parts[2])?),
            );
        }

        let mut edges = Vec::new();
        for parts in read_rows(edges_path.as_ref(), 3)? {
            edges.push((parse_field(&parts[1])?, parse_field(&parts[2])?));
        }

        Ok(Self::new(&vertices, &edges))
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Find the nearest road vertex to a given location
    pub fn find_nearest_vertex(&self, location: &Location) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .map(|node| (node, self.graph[node].haversine_miles(location)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node)
    }

    /// Shortest path length between two vertices in miles
    pub fn shortest_path_distance(&self, start: NodeIndex, end: NodeIndex) -> Option<Cost> {
        if start == end {
            return Some(0.0);
        }
        dijkstra(&self.graph, start, Some(end), |edge| *edge.weight())
            .get(&end)
            .copied()
    }

    /// Calculate the distance between two locations on the road network
    pub fn location_distance(&self, from: &Location, to: &Location) -> Option<Cost> {
        // Find the nearest start and end vertices
        let start_vertex = self.find_nearest_vertex(from)?;
        let end_vertex = self.find_nearest_vertex(to)?;

        // Legs from each location onto the network
        let start_leg = self.graph[start_vertex].haversine_miles(from);
        let end_leg = self.graph[end_vertex].haversine_miles(to);

        let network_distance = self.shortest_path_distance(start_vertex, end_vertex)?;

        Some(start_leg + network_distance + end_leg)
    }
}

impl DistanceProvider for RoadNetwork {
    fn route_cost(
        &self,
        from: &Location,
        to: &Location,
        _mode: TravelMode,
    ) -> Result<Cost, RoutingError> {
        self.location_distance(from, to)
            .ok_or_else(|| RoutingError::NoRoute {
                from: from.to_string(),
                to: to.to_string(),
            })
    }
}

fn read_rows(path: &Path, min_fields: usize) -> Result<Vec<Vec<String>>, io::Error> {
    let reader = io::BufReader::new(File::open(path)?);
    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let parts: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if parts.is_empty() {
            continue;
        }
        if parts.len() < min_fields {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected {} fields in '{}'", min_fields, line),
            ));
        }
        rows.push(parts);
    }
    Ok(rows)
}

fn parse_field<T: std::str::FromStr>(field: &str) -> Result<T, io::Error> {
    field.parse().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("cannot parse '{}'", field),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Three vertices on the equator, about 6.9 miles apart, plus an island
    fn create_test_network() -> RoadNetwork {
        let mut vertices = HashMap::new();
        vertices.insert(1, Location::new(0.0, 0.0));
        vertices.insert(2, Location::new(0.1, 0.0));
        vertices.insert(3, Location::new(0.2, 0.0));
        vertices.insert(9, Location::new(5.0, 5.0));
        RoadNetwork::new(&vertices, &[(1, 2), (2, 3), (3, 42)])
    }

    #[test]
    fn test_shortest_path_sums_edges() {
        let network = create_test_network();
        let a = Location::new(0.0, 0.0);
        let c = Location::new(0.2, 0.0);

        let road = network.location_distance(&a, &c).unwrap();
        assert!((road - a.haversine_miles(&c)).abs() < 1e-6);
    }

    #[test]
    fn test_snap_legs_are_added() {
        let network = create_test_network();
        let off_road = Location::new(0.0, 0.01);
        let c = Location::new(0.2, 0.0);

        let road = network.location_distance(&off_road, &c).unwrap();
        let on_road = network
            .location_distance(&Location::new(0.0, 0.0), &c)
            .unwrap();
        assert!(road > on_road);
    }

    #[test]
    fn test_disconnected_vertex_has_no_route() {
        let network = create_test_network();
        let err = network
            .route_cost(
                &Location::new(0.0, 0.0),
                &Location::new(5.0, 5.0),
                TravelMode::Driving,
            )
            .unwrap_err();
        assert!(matches!(err, RoutingError::NoRoute { .. }));
    }

    #[test]
    fn test_load_from_files() {
        let mut vertices = tempfile::NamedTempFile::new().unwrap();
        writeln!(vertices, "1 0.0 0.0\n2 0.1 0.0\n\n3 0.2 0.0").unwrap();
        let mut edges = tempfile::NamedTempFile::new().unwrap();
        writeln!(edges, "100 1 2\n101 2 3").unwrap();

        let network = RoadNetwork::load(vertices.path(), edges.path()).unwrap();
        assert_eq!(network.vertex_count(), 3);
        assert!(network
            .location_distance(&Location::new(0.0, 0.0), &Location::new(0.2, 0.0))
            .is_some());
    }

    #[test]
    fn test_load_rejects_bad_rows() {
        let mut vertices = tempfile::NamedTempFile::new().unwrap();
        writeln!(vertices, "1 east 0.0").unwrap();
        let edges = tempfile::NamedTempFile::new().unwrap();

        let err = RoadNetwork::load(vertices.path(), edges.path()).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
