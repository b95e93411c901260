//! Feature fusion: one ligand vector and one protein vector become one
//! feature vector.

/// Concatenate a ligand embedding and a protein embedding, ligand first.
///
/// The ligand-first order is fixed for the whole run. Every caller, in
/// training and in any later inference, goes through this one function so
/// the layout cannot drift between the two.
pub fn fuse(ligand: &[f32], protein: &[f32]) -> Vec<f32> {
    let mut fused = Vec::with_capacity(ligand.len() + protein.len());
    fused.extend_from_slice(ligand);
    fused.extend_from_slice(protein);
    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fused_length_is_sum_of_parts() {
        let ligand = vec![0.5; 32];
        let protein = vec![-1.5; 48];
        assert_eq!(fuse(&ligand, &protein).len(), 80);
    }

    #[test]
    fn ligand_values_come_first() {
        let ligand = [1.0, 2.0, 3.0];
        let protein = [9.0, 8.0];
        let fused = fuse(&ligand, &protein);
        assert_eq!(&fused[..3], &ligand);
        assert_eq!(&fused[3..], &protein);
    }

    #[test]
    fn empty_sides_are_passed_through() {
        assert_eq!(fuse(&[], &[1.0]), vec![1.0]);
        assert_eq!(fuse(&[1.0], &[]), vec![1.0]);
    }
}
