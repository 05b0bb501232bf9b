//! Clustering engine: greedy online assignment with dynamic cluster
//! creation, a partitioned parallel variant of the same pass, a fixed number
//! of centroid-refinement rounds, and the post-ranking merge that collapses
//! clusters which drifted together.
//!
//! This is an approximate k-means where the cluster count is discovered
//! rather than fixed; assignment is order-dependent on purpose, trading
//! optimality for interactive latency.

use image::Rgb;
use rayon::prelude::*;

use crate::color::square_distance;
use crate::settings;

/// One discovered color cluster. `members` only holds the current round's
/// assignment; history is not retained across refinement rounds.
#[derive(Debug, Clone)]
pub(crate) struct Cluster {
    pub centroid: Rgb<u8>,
    pub members: Vec<Rgb<u8>>,
    /// Share of all samples assigned to this cluster, in `[0, 1]`.
    pub ratio: f64,
    /// Whether `members[0]` is the synthetic centroid anchor inserted at the
    /// start of a refinement round rather than a real sample.
    anchored: bool,
}

impl Cluster {
    fn seed(color: Rgb<u8>) -> Self {
        Self {
            centroid: color,
            members: vec![color],
            ratio: 0.0,
            anchored: false,
        }
    }

    /// Recompute the centroid as the integer mean of the current members,
    /// refresh the ratio, and reset the member list to the bare centroid for
    /// the next assignment pass.
    fn refresh(&mut self, total_samples: usize) {
        let count = self.members.len() as u64;
        let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
        for member in &self.members {
            r += u64::from(member[0]);
            g += u64::from(member[1]);
            b += u64::from(member[2]);
        }
        self.centroid = Rgb([(r / count) as u8, (g / count) as u8, (b / count) as u8]);

        let assigned = self.members.len() - usize::from(self.anchored);
        self.ratio = (assigned as f64 / total_samples as f64).clamp(0.0, 1.0);

        self.members.clear();
        self.members.push(self.centroid);
        self.anchored = true;
    }
}

/// Greedy online assignment: the first cluster whose centroid is within the
/// distance threshold absorbs the sample; otherwise the sample founds a new
/// cluster. Centroids are not recomputed mid-pass.
fn position_color(color: Rgb<u8>, clusters: &mut Vec<Cluster>) {
    for cluster in clusters.iter_mut() {
        if square_distance(color, cluster.centroid) < settings::MIN_SQUARE_DISTANCE {
            cluster.members.push(color);
            return;
        }
    }
    clusters.push(Cluster::seed(color));
}

fn worker_count() -> usize {
    std::thread::available_parallelism().map_or(1, |cores| cores.get().min(settings::MAX_WORKERS))
}

/// One assignment pass over the full sample set, extending `clusters` in
/// place. Large inputs are split into contiguous chunks assigned
/// independently; each chunk returns its own cluster set and a single
/// reduction absorbs near-duplicates, so no worker ever touches another's
/// partition.
pub(crate) fn assign(samples: &[Rgb<u8>], clusters: &mut Vec<Cluster>) {
    let workers = worker_count();
    if samples.len() < settings::PARALLEL_MIN_SAMPLES || workers < 2 {
        for &color in samples {
            position_color(color, clusters);
        }
        return;
    }

    let chunk_len = samples.len().div_ceil(workers);
    let partials: Vec<Vec<Cluster>> = samples
        .par_chunks(chunk_len)
        .map(|chunk| {
            let mut local = Vec::new();
            for &color in chunk {
                position_color(color, &mut local);
            }
            local
        })
        .collect();

    for partial in partials {
        clusters.extend(partial);
    }
    absorb_close(clusters);
}

/// Merge step of the parallel pass: for every pair of clusters whose
/// centroids fall within the threshold, the one with fewer samples is
/// absorbed into the other. The survivor keeps its centroid; a synthetic
/// anchor never migrates.
fn absorb_close(clusters: &mut Vec<Cluster>) {
    for a in 0..clusters.len() {
        if clusters[a].members.is_empty() {
            continue;
        }
        for b in (a + 1)..clusters.len() {
            if clusters[b].members.is_empty() {
                continue;
            }
            if square_distance(clusters[a].centroid, clusters[b].centroid)
                >= settings::MIN_SQUARE_DISTANCE
            {
                continue;
            }
            let (winner, loser) = if clusters[a].members.len() >= clusters[b].members.len() {
                (a, b)
            } else {
                (b, a)
            };
            let anchor = usize::from(clusters[loser].anchored);
            let mut moved = std::mem::take(&mut clusters[loser].members);
            clusters[winner].members.extend(moved.drain(anchor..));
            if winner == b {
                break;
            }
        }
    }
    clusters.retain(|cluster| !cluster.members.is_empty());
}

/// Run the full clustering: initial assignment followed by exactly
/// [`settings::REFINEMENT_ROUNDS`] rounds of centroid recomputation and
/// reassignment. Zero samples produce zero clusters.
pub(crate) fn cluster(samples: &[Rgb<u8>]) -> Vec<Cluster> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut clusters = Vec::new();
    assign(samples, &mut clusters);

    for _ in 0..settings::REFINEMENT_ROUNDS {
        clusters
            .par_iter_mut()
            .for_each(|cluster| cluster.refresh(samples.len()));
        assign(samples, &mut clusters);
    }
    clusters
}

/// Collapse near-duplicate clusters in a score-ranked list. Scanning from
/// the lowest-ranked cluster upward, the first higher-ranked cluster within
/// the threshold receives a ratio-weighted blend of the two centroids and
/// the combined ratio; the lower-ranked cluster is removed.
pub(crate) fn merge_ranked(clusters: &mut Vec<Cluster>) {
    let mut remove = Vec::new();
    for src in (0..clusters.len()).rev() {
        for dst in 0..src {
            if square_distance(clusters[src].centroid, clusters[dst].centroid)
                >= settings::MIN_SQUARE_DISTANCE
            {
                continue;
            }
            // A zero-ratio destination contributes nothing to the blend.
            let weight = if clusters[dst].ratio > f64::EPSILON {
                clusters[src].ratio / clusters[dst].ratio
            } else {
                1.0
            };
            let blend = |s: u8, d: u8| {
                (weight * f64::from(s) + (1.0 - weight) * f64::from(d)).clamp(0.0, 255.0) as u8
            };
            let (s, d) = (clusters[src].centroid, clusters[dst].centroid);
            clusters[dst].centroid = Rgb([blend(s[0], d[0]), blend(s[1], d[1]), blend(s[2], d[2])]);
            clusters[dst].ratio += clusters[src].ratio;
            remove.push(src);
            break;
        }
    }
    // Indices were collected in decreasing order, so removal is stable.
    for index in remove {
        clusters.remove(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

    #[test]
    fn single_sample_forms_one_full_cluster() {
        let clusters = cluster(&[RED]);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].centroid, RED);
        assert!((clusters[0].ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn two_distant_colors_form_two_half_clusters() {
        let clusters = cluster(&[RED, RED, BLUE, BLUE]);
        assert_eq!(clusters.len(), 2);
        for c in &clusters {
            assert!((c.ratio - 0.5).abs() < 1e-9, "ratio: {}", c.ratio);
        }
        // First-seen order survives clustering.
        assert_eq!(clusters[0].centroid, RED);
        assert_eq!(clusters[1].centroid, BLUE);
    }

    #[test]
    fn near_identical_colors_collapse_into_one_cluster() {
        let clusters = cluster(&[RED, Rgb([250, 4, 2]), Rgb([252, 1, 3])]);
        assert_eq!(clusters.len(), 1);
        assert!((clusters[0].ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ratios_sum_to_at_most_one() {
        let samples: Vec<Rgb<u8>> = (0u8..64).map(|i| Rgb([255 - i * 2, i, i * 3])).collect();
        let clusters = cluster(&samples);
        let total: f64 = clusters.iter().map(|c| c.ratio).sum();
        assert!(total <= 1.0 + 1e-6, "ratio sum: {total}");
    }

    #[test]
    fn parallel_assignment_matches_serial_partitioning() {
        // Large enough to cross the parallel threshold; two well separated
        // colors must still come out as two clusters covering everything.
        let mut samples = vec![RED; 40_000];
        samples.extend(vec![BLUE; 40_000]);
        let clusters = cluster(&samples);
        assert_eq!(clusters.len(), 2);
        let total: f64 = clusters.iter().map(|c| c.ratio).sum();
        assert!((total - 1.0).abs() < 1e-3, "ratio sum: {total}");
    }

    #[test]
    fn absorb_prefers_the_larger_cluster() {
        let mut big = Cluster::seed(RED);
        big.members = vec![RED; 10];
        let small = Cluster::seed(Rgb([250, 5, 5]));
        let mut clusters = vec![small, big];
        absorb_close(&mut clusters);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].centroid, RED);
        assert_eq!(clusters[0].members.len(), 11);
    }

    #[test]
    fn merge_accumulates_ratio_into_the_higher_ranked_cluster() {
        let mut a = Cluster::seed(RED);
        a.ratio = 0.6;
        let mut b = Cluster::seed(Rgb([250, 5, 5]));
        b.ratio = 0.3;
        let mut clusters = vec![a, b];
        merge_ranked(&mut clusters);
        assert_eq!(clusters.len(), 1);
        assert!((clusters[0].ratio - 0.9).abs() < 1e-9);
    }

    #[test]
    fn merge_leaves_distant_clusters_alone() {
        let mut a = Cluster::seed(RED);
        a.ratio = 0.5;
        let mut b = Cluster::seed(BLUE);
        b.ratio = 0.5;
        let mut clusters = vec![a, b];
        merge_ranked(&mut clusters);
        assert_eq!(clusters.len(), 2);
    }
}
