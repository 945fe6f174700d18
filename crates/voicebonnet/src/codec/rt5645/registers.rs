//! RT5645 register map (clocking, ASRC and IRQ subset)
//!
//! All registers are 16 bits wide, addressed by one byte, and transferred
//! MSB first.

// ---------------------------------------------------------------------------
// Register addresses
// ---------------------------------------------------------------------------

/// Software reset / vendor ID
pub const REG_RESET: u8 = 0x00;

/// Global clock control: sysclk source and PLL1 input
pub const REG_GLB_CLK: u8 = 0x80;

/// PLL control 1: N (bits 15:7) and K (bits 4:0)
pub const REG_PLL_CTRL1: u8 = 0x81;

/// PLL control 2: M (bits 15:12) and M bypass (bit 11)
pub const REG_PLL_CTRL2: u8 = 0x82;

/// ASRC control 2: stereo / mono DAC and stereo ADC filter clock select
pub const REG_ASRC_2: u8 = 0x84;

/// ASRC control 3: mono ADC filter clock select
pub const REG_ASRC_3: u8 = 0x85;

/// IRQ control 2: jack-detect IRQ enables
pub const REG_IRQ_CTRL2: u8 = 0xBE;

/// Internal IRQ status
pub const REG_INT_IRQ_ST: u8 = 0xBF;

/// GPIO control 1: GPIO1 pin function
pub const REG_GPIO_CTRL1: u8 = 0xC0;

// ---------------------------------------------------------------------------
// REG_GLB_CLK fields
// ---------------------------------------------------------------------------

/// Sysclk source field (bits 15:14)
pub const GLB_CLK_SCLK_SRC_MASK: u16 = 0x3 << 14;
/// Sysclk from MCLK
pub const GLB_CLK_SCLK_SRC_MCLK: u16 = 0;
/// Sysclk from PLL1
pub const GLB_CLK_SCLK_SRC_PLL1: u16 = 0x1 << 14;
/// Sysclk from the internal RC oscillator
pub const GLB_CLK_SCLK_SRC_RCCLK: u16 = 0x2 << 14;

/// PLL1 input field (bits 13:11)
pub const GLB_CLK_PLL1_SRC_MASK: u16 = 0x7 << 11;
/// PLL1 from MCLK
pub const GLB_CLK_PLL1_SRC_MCLK: u16 = 0;
/// PLL1 from I2S1 BCLK
pub const GLB_CLK_PLL1_SRC_BCLK1: u16 = 0x1 << 11;
/// PLL1 from I2S2 BCLK
pub const GLB_CLK_PLL1_SRC_BCLK2: u16 = 0x2 << 11;

// ---------------------------------------------------------------------------
// PLL fields
// ---------------------------------------------------------------------------

/// N code shift in REG_PLL_CTRL1
pub const PLL_N_SHIFT: u16 = 7;
/// N code maximum (9 bits)
pub const PLL_N_MAX: u16 = 0x1FF;
/// K code maximum (5 bits)
pub const PLL_K_MAX: u8 = 0x1F;
/// M code shift in REG_PLL_CTRL2
pub const PLL_M_SHIFT: u16 = 12;
/// M code maximum (4 bits)
pub const PLL_M_MAX: u8 = 0xF;
/// M bypass bit in REG_PLL_CTRL2
pub const PLL_M_BYPASS: u16 = 1 << 11;

// ---------------------------------------------------------------------------
// ASRC clock-select fields (4 bits each)
// ---------------------------------------------------------------------------

/// Width mask of one clock-select field, before shifting
pub const ASRC_SEL_MASK: u16 = 0xF;
/// Stereo DAC filter select shift (REG_ASRC_2)
pub const ASRC_DA_STO_SHIFT: u16 = 12;
/// Left mono DAC filter select shift (REG_ASRC_2)
pub const ASRC_DA_MONO_L_SHIFT: u16 = 8;
/// Right mono DAC filter select shift (REG_ASRC_2)
pub const ASRC_DA_MONO_R_SHIFT: u16 = 4;
/// Stereo ADC filter select shift (REG_ASRC_2)
pub const ASRC_AD_STO_SHIFT: u16 = 0;
/// Left mono ADC filter select shift (REG_ASRC_3)
pub const ASRC_AD_MONO_L_SHIFT: u16 = 12;
/// Right mono ADC filter select shift (REG_ASRC_3)
pub const ASRC_AD_MONO_R_SHIFT: u16 = 8;

/// Filter clocked from sysclk
pub const ASRC_CLK_SYSCLK: u16 = 0x0;
/// Filter clocked from the I2S1 ASRC
pub const ASRC_CLK_I2S1_ASRC: u16 = 0x1;
/// Filter clocked from the I2S2 ASRC
pub const ASRC_CLK_I2S2_ASRC: u16 = 0x2;

// ---------------------------------------------------------------------------
// Jack detect
// ---------------------------------------------------------------------------

/// JD1 IRQ enable (REG_IRQ_CTRL2)
pub const IRQ_JD1_EN: u16 = 1 << 15;
/// GPIO1 pin drives the IRQ output (REG_GPIO_CTRL1)
pub const GPIO1_IS_IRQ: u16 = 1 << 15;
/// JD1 level in REG_INT_IRQ_ST; low while a plug is inserted
pub const INT_IRQ_ST_JD1: u16 = 1 << 5;
