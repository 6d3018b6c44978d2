/// Union-find over piece indices.
///
/// Union by size keeps trees shallow; `union` also compresses the paths it walks. Queries take
/// `&self` so renderers and hit tests never need mutable access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&self, mut i: usize) -> usize {
        while self.parent[i] != i {
            i = self.parent[i];
        }
        i
    }

    fn find_compress(&mut self, i: usize) -> usize {
        let root = self.find(i);
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Merges the sets holding `a` and `b`. Returns `false` if they were already together.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find_compress(a);
        let rb = self.find_compress(b);
        if ra == rb {
            return false;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        true
    }

    pub fn same(&self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Number of elements in the set holding `i`.
    pub fn size(&self, i: usize) -> usize {
        self.size[self.find(i)]
    }

    /// All elements in the set holding `i`, in ascending order.
    pub fn members(&self, i: usize) -> Vec<usize> {
        let root = self.find(i);
        (0..self.parent.len())
            .filter(|&j| self.find(j) == root)
            .collect()
    }

    pub fn set_count(&self) -> usize {
        (0..self.parent.len())
            .filter(|&i| self.parent[i] == i)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_as_singletons() {
        let set = DisjointSet::new(4);
        assert_eq!(set.set_count(), 4);
        for i in 0..4 {
            assert_eq!(set.size(i), 1);
            assert_eq!(set.members(i), vec![i]);
        }
    }

    #[test]
    fn union_merges_sizes_and_reports_noops() {
        let mut set = DisjointSet::new(5);
        assert!(set.union(0, 1));
        assert!(set.union(3, 4));
        assert!(!set.union(1, 0));
        assert!(set.union(4, 1));

        for i in [0, 1, 3, 4] {
            assert_eq!(set.size(i), 4);
        }
        assert_eq!(set.size(2), 1);
        assert_eq!(set.members(3), vec![0, 1, 3, 4]);
        assert!(set.same(0, 4));
        assert!(!set.same(0, 2));
        assert_eq!(set.set_count(), 2);
    }

    #[test]
    fn chain_of_unions_reaches_everyone() {
        let n = 64;
        let mut set = DisjointSet::new(n);
        for i in 1..n {
            assert!(set.union(i - 1, i));
        }
        assert_eq!(set.size(0), n);
        assert_eq!(set.set_count(), 1);
    }
}
