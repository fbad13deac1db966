//! Occupancy

/// 範囲内の各識別子のFREE/IN_USE状態を保持するための構造体.
///
/// スロットは`pid - lower`で添字付けされ、添字計算はこの型の中に閉じている.
/// 領域自体は構築時に一度だけ確保され、以後サイズが変わることは無い.
#[derive(Debug)]
pub struct Occupancy {
    slots: Vec<bool>,
}
impl Occupancy {
    /// `len`個のスロットを持つ`Occupancy`インスタンスを生成する.
    ///
    /// 全スロットの初期状態はFREE.
    pub fn new(len: usize) -> Self {
        Occupancy {
            slots: vec![false; len],
        }
    }

    /// 全スロットをFREEに戻す.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot = false;
        }
    }

    /// `index`番目のスロットが空いているかどうかを判定する.
    pub fn is_free(&self, index: usize) -> bool {
        !self.slots[index]
    }

    /// `index`番目のスロットをIN_USEにする.
    pub fn set_in_use(&mut self, index: usize) {
        self.slots[index] = true;
    }

    /// `index`番目のスロットをFREEにする.
    pub fn set_free(&mut self, index: usize) {
        self.slots[index] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        let mut occupancy = Occupancy::new(3);
        assert!(occupancy.is_free(0));

        occupancy.set_in_use(0);
        occupancy.set_in_use(2);
        assert!(!occupancy.is_free(0));
        assert!(occupancy.is_free(1));
        assert!(!occupancy.is_free(2));

        occupancy.set_free(0);
        assert!(occupancy.is_free(0));

        occupancy.set_in_use(1);
        occupancy.reset();
        assert!((0..3).all(|i| occupancy.is_free(i)));
    }

    #[test]
    #[should_panic]
    fn out_of_bounds() {
        let occupancy = Occupancy::new(3);
        occupancy.is_free(3);
    }
}
